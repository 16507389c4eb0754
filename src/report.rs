// src/report.rs
use std::fmt::Write as _;

use crate::analysis::types::{DustbinColor, WasteClassification};

/// Render a classification as the plain-text report printed by `scan` and
/// copied from the GUI. Section order follows the dashboard tabs.
pub fn render_text(classification: &WasteClassification) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Waste Classification ===");
    let _ = writeln!(out, "Item:           {}", classification.item_name);
    let _ = writeln!(out, "Category:       {}", classification.category);
    if !classification.recyclability.is_empty() {
        let _ = writeln!(out, "Recyclability:  {}", classification.recyclability);
    }
    let _ = writeln!(
        out,
        "Dustbin color:  {}",
        classification.dustbin_color.as_str()
    );

    let _ = writeln!(out, "\n--- Material Composition ---");
    if !classification.material_composition.is_empty() {
        let _ = writeln!(out, "{}", classification.material_composition);
    }
    for material in &classification.detailed_materials {
        let _ = writeln!(out, "  - {}", material);
    }

    let _ = writeln!(out, "\n--- Disposal Protocol ---");
    for (i, step) in classification.disposal_instructions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, step);
    }

    let _ = writeln!(out, "\n--- Environmental Impact ---");
    let _ = writeln!(out, "{}", classification.environmental_impact);

    if !classification.eco_tips.is_empty() {
        let _ = writeln!(out, "\n--- Eco Strategy ---");
        for tip in &classification.eco_tips {
            let _ = writeln!(out, "  - {}", tip);
        }
    }

    if !classification.upcycling_ideas.is_empty() {
        let _ = writeln!(out, "\n--- Upcycling Lab ---");
        for idea in &classification.upcycling_ideas {
            let _ = writeln!(out, "  - {}", idea);
        }
    }

    out
}

pub fn render_json(classification: &WasteClassification) -> serde_json::Result<String> {
    serde_json::to_string_pretty(classification)
}

/// Display color for a sorting bin in the GUI strip.
pub fn bin_rgb(color: DustbinColor) -> (u8, u8, u8) {
    match color {
        DustbinColor::Green => (34, 197, 94),
        DustbinColor::Blue => (59, 130, 246),
        DustbinColor::Yellow => (234, 179, 8),
        DustbinColor::Red => (239, 68, 68),
        DustbinColor::Black => (17, 17, 17),
    }
}
