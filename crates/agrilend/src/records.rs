//! Domain records shown by the listing screens.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FarmerStatus {
    Active,
    Inactive,
    Pending,
}

impl FarmerStatus {
    pub const ALL: [FarmerStatus; 3] = [
        FarmerStatus::Active,
        FarmerStatus::Inactive,
        FarmerStatus::Pending,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FarmerStatus::Active => "Active",
            FarmerStatus::Inactive => "Inactive",
            FarmerStatus::Pending => "Pending",
        }
    }
}

/// Farming ecosystem of a registered farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ecosystem {
    Irrigated,
    Rainfed,
    Upland,
}

impl Ecosystem {
    pub const ALL: [Ecosystem; 3] = [Ecosystem::Irrigated, Ecosystem::Rainfed, Ecosystem::Upland];

    pub fn as_str(self) -> &'static str {
        match self {
            Ecosystem::Irrigated => "Irrigated",
            Ecosystem::Rainfed => "Rainfed",
            Ecosystem::Upland => "Upland",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CropStatus {
    Planted,
    Growing,
    Harvested,
    Damaged,
}

impl CropStatus {
    pub const ALL: [CropStatus; 4] = [
        CropStatus::Planted,
        CropStatus::Growing,
        CropStatus::Harvested,
        CropStatus::Damaged,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CropStatus::Planted => "Planted",
            CropStatus::Growing => "Growing",
            CropStatus::Harvested => "Harvested",
            CropStatus::Damaged => "Damaged",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(FarmerStatus, Ecosystem, CropStatus);

/// A farmer enrolled in the lending program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farmer {
    pub id: String,
    pub name: String,
    pub barangay: String,
    pub municipality: String,
    pub status: FarmerStatus,
    pub ecosystem: Ecosystem,
    pub farm_area_ha: f64,
    pub loan_amount: f64,
    pub registered_on: NaiveDate,
}

/// A planting on one farmer's land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub id: String,
    pub farmer_id: String,
    pub crop_type: String,
    pub variety: String,
    pub area_ha: f64,
    pub planted_on: NaiveDate,
    #[serde(default)]
    pub expected_harvest: Option<NaiveDate>,
    pub status: CropStatus,
}

/// A filed crop damage report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropReport {
    pub id: String,
    pub crop_id: String,
    pub reported_on: NaiveDate,
    pub damage_type: String,
    pub damage_percentage: f64,
    pub estimated_loss: f64,
    #[serde(default)]
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_serialize_as_labels() {
        let json = serde_json::to_string(&FarmerStatus::Active).unwrap();
        assert_eq!(json, "\"Active\"");
        assert_eq!(Ecosystem::Rainfed.to_string(), "Rainfed");
    }

    #[test]
    fn optional_fields_default_when_missing() {
        let crop: Crop = serde_json::from_str(
            r#"{"id":"C-1","farmer_id":"F-1","crop_type":"Rice","variety":"NSIC Rc 222",
                "area_ha":1.5,"planted_on":"2024-06-01","status":"Growing"}"#,
        )
        .unwrap();
        assert_eq!(crop.expected_harvest, None);
    }
}
