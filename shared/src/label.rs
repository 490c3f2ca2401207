use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

/// Disease categories the classifier can return.
///
/// The wire form is the upper snake case name (`LEAF_BLIGHT`), which is also
/// what `FromStr` accepts and `as_str` returns.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum DiseaseLabel {
    #[serde(rename = "ALGAL_LEAF_SPOT")]
    #[strum(serialize = "ALGAL_LEAF_SPOT")]
    AlgalLeafSpot,
    #[serde(rename = "HEALTHY_LEAF")]
    #[strum(serialize = "HEALTHY_LEAF")]
    HealthyLeaf,
    #[serde(rename = "LEAF_BLIGHT")]
    #[strum(serialize = "LEAF_BLIGHT")]
    LeafBlight,
    #[serde(rename = "PHOMOPSIS_LEAF_SPOT")]
    #[strum(serialize = "PHOMOPSIS_LEAF_SPOT")]
    PhomopsisLeafSpot,
}

impl DiseaseLabel {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DiseaseLabel::AlgalLeafSpot => "Algal leaf spot",
            DiseaseLabel::HealthyLeaf => "Healthy leaf",
            DiseaseLabel::LeafBlight => "Leaf blight",
            DiseaseLabel::PhomopsisLeafSpot => "Phomopsis leaf spot",
        }
    }

    /// Display name for a raw wire label, falling back to the raw string.
    pub fn display_name_for(raw: &str) -> &str {
        raw.parse::<DiseaseLabel>()
            .map(|label| label.display_name())
            .unwrap_or(raw)
    }
}

impl std::fmt::Display for DiseaseLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
