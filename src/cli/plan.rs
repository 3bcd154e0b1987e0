// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Plan command - show the stage graph

use miette::Result;

use super::PlanFormat;
use crate::pipeline::StageRegistry;

/// Render the built-in registry in `format`
pub fn render(format: PlanFormat) -> Result<String> {
    let registry = StageRegistry::builtin()?;
    let dag = registry.dag()?;

    let output = match format {
        PlanFormat::Text => dag.to_text(registry.stages()),
        PlanFormat::Dot => dag.to_dot(registry.stages()),
        PlanFormat::Mermaid => dag.to_mermaid(registry.stages()),
    };
    Ok(output)
}

/// Run the plan command
pub fn run(format: PlanFormat) -> Result<()> {
    println!("{}", render(format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_formats() {
        let text = render(PlanFormat::Text).unwrap();
        assert!(text.contains("#13 visuals"));

        let dot = render(PlanFormat::Dot).unwrap();
        assert!(dot.starts_with("digraph"));

        let mermaid = render(PlanFormat::Mermaid).unwrap();
        assert!(mermaid.contains("link -->|draft_v3_linked.md| visuals"));
    }
}
