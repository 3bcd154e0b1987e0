// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! Stage voice lines
//!
//! Per-stage start / done / error lines keyed by stage id. Stages without
//! an entry use the generic lines.

struct Voice {
    id: &'static str,
    start: &'static str,
    done: &'static str,
    error: &'static str,
}

const VOICES: &[Voice] = &[
    Voice {
        id: "persona",
        start: "Understood. Let us think about who we are writing for.",
        done: "I see a way to win them over.",
        error: "Not enough to go on",
    },
    Voice {
        id: "keywords",
        start: "Heading out to see what readers are searching for.",
        done: "Found what they are looking for.",
        error: "Too much fog to make anything out",
    },
    Voice {
        id: "serp",
        start: "Scouting the pages that already rank.",
        done: "Enemy positions mapped. Report complete.",
        error: "Cannot continue the scouting run",
    },
    Voice {
        id: "structure",
        start: "Right, time to draw up the blueprint!",
        done: "This one is going to be good work.",
        error: "Not enough material to build with",
    },
    Voice {
        id: "audit",
        start: "Let us see what the architect came up with.",
        done: "Passable, I suppose.",
        error: "The outline never arrived",
    },
    Voice {
        id: "research",
        start: "A claim without a source is idle talk. Research begins.",
        done: "Research complete. Every claim is sourced.",
        error: "The library is on fire",
    },
    Voice {
        id: "draft",
        start: "The words are flowing! Writing the first draft.",
        done: "First draft written!",
        error: "The pen snapped",
    },
    Voice {
        id: "critique",
        start: "Hand it over. Let me read it.",
        done: "I have said what needed saying.",
        error: "The first draft has not arrived",
    },
    Voice {
        id: "rewrite",
        start: "Yes, yes, rewriting it now...",
        done: "Rewrite finished. Please be kind.",
        error: "Cannot find the critique report",
    },
    Voice {
        id: "count",
        start: "Counting every character, one by one.",
        done: "The ledger balances.",
        error: "The ledger is unreadable",
    },
    Voice {
        id: "link",
        start: "Processing. Linking related material.",
        done: "Links in place. Stamped and approved.",
        error: "Could not read the draft",
    },
    Voice {
        id: "visuals",
        start: "Inspiration strikes! The colors are calling!",
        done: "Behold, my soul on the page!",
        error: "The brush broke",
    },
    Voice {
        id: "gatekeeper",
        start: "Inspection begins. Nothing half-finished goes upstairs.",
        done: "Inspection complete. Sending it up for final review.",
        error: "Nothing to inspect",
    },
];

fn voice(id: &str) -> Option<&'static Voice> {
    VOICES.iter().find(|v| v.id == id)
}

/// Line logged when a stage starts
pub fn start_line(id: &str) -> String {
    voice(id)
        .map(|v| v.start.to_string())
        .unwrap_or_else(|| "Reporting for duty.".to_string())
}

/// Line logged when a stage has written `output`
pub fn done_line(id: &str, output: &str) -> String {
    match voice(id) {
        Some(v) => format!("{} -> {}", v.done, output),
        None => format!("Done -> {}", output),
    }
}

/// Line logged when a stage fails with `detail`
pub fn error_line(id: &str, detail: &str) -> String {
    match voice(id) {
        Some(v) => format!("{}: {}", v.error, detail),
        None => detail.to_string(),
    }
}
