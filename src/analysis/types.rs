// src/analysis/types.rs
use serde::{Deserialize, Serialize};

use super::error::ClassifyError;

/// Standard global sorting colors. The only closed field in the contract;
/// anything outside this set is rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DustbinColor {
    Green,
    Blue,
    Yellow,
    Red,
    Black,
}

impl DustbinColor {
    pub const ALL: [DustbinColor; 5] = [
        DustbinColor::Green,
        DustbinColor::Blue,
        DustbinColor::Yellow,
        DustbinColor::Red,
        DustbinColor::Black,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DustbinColor::Green => "Green",
            DustbinColor::Blue => "Blue",
            DustbinColor::Yellow => "Yellow",
            DustbinColor::Red => "Red",
            DustbinColor::Black => "Black",
        }
    }
}

/// One analysis result as returned by the vision model. Immutable once
/// parsed; everything except `dustbin_color` is untrusted free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteClassification {
    pub item_name: String,
    pub category: String,
    #[serde(default)]
    pub material_composition: String,
    /// Ordered, dominant material first (e.g. "PET Plastic 92%").
    pub detailed_materials: Vec<String>,
    /// Ordered procedural steps.
    pub disposal_instructions: Vec<String>,
    #[serde(default)]
    pub recyclability: String,
    pub environmental_impact: String,
    #[serde(default)]
    pub eco_tips: Vec<String>,
    #[serde(default)]
    pub upcycling_ideas: Vec<String>,
    pub dustbin_color: DustbinColor,
}

impl WasteClassification {
    /// Checks the fields the response schema marks as required. Serde already
    /// rejects missing keys; this catches present-but-blank answers.
    pub fn validate(&self) -> Result<(), ClassifyError> {
        if self.item_name.trim().is_empty() {
            return Err(ClassifyError::InvalidFormat("itemName is blank".into()));
        }
        if self.category.trim().is_empty() {
            return Err(ClassifyError::InvalidFormat("category is blank".into()));
        }
        if self.detailed_materials.is_empty() {
            return Err(ClassifyError::InvalidFormat(
                "detailedMaterials is empty".into(),
            ));
        }
        if self.disposal_instructions.is_empty() {
            return Err(ClassifyError::InvalidFormat(
                "disposalInstructions is empty".into(),
            ));
        }
        if self.environmental_impact.trim().is_empty() {
            return Err(ClassifyError::InvalidFormat(
                "environmentalImpact is blank".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conformant_json() -> &'static str {
        r#"{
            "itemName": "PET Bottle",
            "category": "Recyclable",
            "materialComposition": "Polyethylene terephthalate body with a PP cap",
            "detailedMaterials": ["PET Plastic 95%", "Polypropylene Cap 5%"],
            "disposalInstructions": ["Rinse", "Remove cap", "Place in recycling bin"],
            "recyclability": "High - Widely Recycled",
            "environmentalImpact": "Persists for centuries in landfill",
            "ecoTips": ["Prefer refillable bottles"],
            "upcyclingIdeas": ["Bird feeder", "Desk organizer", "Planter"],
            "dustbinColor": "Blue"
        }"#
    }

    #[test]
    fn parses_conformant_response() {
        let c: WasteClassification = serde_json::from_str(conformant_json()).unwrap();
        assert_eq!(c.item_name, "PET Bottle");
        assert_eq!(c.dustbin_color, DustbinColor::Blue);
        assert_eq!(c.disposal_instructions.len(), 3);
        assert_eq!(c.detailed_materials[0], "PET Plastic 95%");
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_bin_color() {
        let json = conformant_json().replace("\"Blue\"", "\"Purple\"");
        assert!(serde_json::from_str::<WasteClassification>(&json).is_err());
    }

    #[test]
    fn rejects_missing_required_field() {
        // Drop dustbinColor entirely
        let json = conformant_json().replace("\"dustbinColor\": \"Blue\"", "\"x\": 1");
        assert!(serde_json::from_str::<WasteClassification>(&json).is_err());
    }

    #[test]
    fn optional_fields_default_when_omitted() {
        let json = r#"{
            "itemName": "Banana Peel",
            "category": "Organic",
            "detailedMaterials": ["Organic matter 100%"],
            "disposalInstructions": ["Compost it"],
            "environmentalImpact": "Biodegrades within weeks",
            "dustbinColor": "Green"
        }"#;
        let c: WasteClassification = serde_json::from_str(json).unwrap();
        assert!(c.recyclability.is_empty());
        assert!(c.eco_tips.is_empty());
        assert!(c.upcycling_ideas.is_empty());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn validate_catches_blank_required_text() {
        let mut c: WasteClassification = serde_json::from_str(conformant_json()).unwrap();
        c.environmental_impact = "  ".to_string();
        assert!(c.validate().is_err());
    }

    #[test]
    fn bin_color_serializes_as_bare_name() {
        let s = serde_json::to_string(&DustbinColor::Yellow).unwrap();
        assert_eq!(s, "\"Yellow\"");
    }
}
