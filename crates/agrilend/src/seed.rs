//! Deterministic demo records for mock mode.

use chrono::{Days, NaiveDate};

use crate::records::{Crop, CropReport, CropStatus, Ecosystem, Farmer, FarmerStatus};
use crate::schemas::{CROP_TYPES, DAMAGE_TYPES};

const FARMER_COUNT: usize = 42;
const CROP_COUNT: usize = 60;
const REPORT_COUNT: usize = 24;

const GIVEN_NAMES: [&str; 12] = [
    "Juan", "Maria", "José", "Ana", "Pedro", "Rosario", "Ramon", "Lourdes", "Emilio", "Teresita",
    "Andrés", "Corazon",
];

const SURNAMES: [&str; 7] = [
    "Dela Cruz",
    "Santos",
    "Reyes",
    "Bautista",
    "Garcia",
    "Mendoza",
    "Villanueva",
];

const PLACES: [(&str, &str); 6] = [
    ("San Isidro", "Cabanatuan"),
    ("Poblacion", "Talavera"),
    ("Santo Niño", "Guimba"),
    ("Bagong Sikat", "Muñoz"),
    ("Malaya", "Talavera"),
    ("San Roque", "Cabanatuan"),
];

const VARIETIES: [&str; 4] = ["NSIC Rc 222", "Pioneer 30T80", "Hybrid Ampalaya", "Rayong 5"];

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 8).unwrap_or(NaiveDate::MIN)
}

fn days_after(days: usize) -> NaiveDate {
    let base = base_date();
    base.checked_add_days(Days::new(days as u64)).unwrap_or(base)
}

fn farmer_status(i: usize) -> FarmerStatus {
    if i % 7 == 3 {
        FarmerStatus::Inactive
    } else if i % 5 == 4 {
        FarmerStatus::Pending
    } else {
        FarmerStatus::Active
    }
}

pub fn farmers() -> Vec<Farmer> {
    (0..FARMER_COUNT)
        .map(|i| {
            let (barangay, municipality) = PLACES[i % PLACES.len()];
            let given = GIVEN_NAMES[i % GIVEN_NAMES.len()];
            let surname = SURNAMES[i % SURNAMES.len()];
            Farmer {
                id: format!("F-{:04}", i + 1),
                name: format!("{given} {surname}"),
                barangay: barangay.to_string(),
                municipality: municipality.to_string(),
                status: farmer_status(i),
                ecosystem: Ecosystem::ALL[i % Ecosystem::ALL.len()],
                farm_area_ha: 0.5 + (i % 8) as f64 * 0.25,
                loan_amount: 15_000.0 + (i % 6) as f64 * 5_000.0,
                registered_on: days_after(i * 6),
            }
        })
        .collect()
}

pub fn crops() -> Vec<Crop> {
    (0..CROP_COUNT)
        .map(|i| {
            let kind = i % CROP_TYPES.len();
            let planted_on = days_after(30 + i * 3);
            let status = CropStatus::ALL[i % CropStatus::ALL.len()];
            Crop {
                id: format!("C-{:04}", i + 1),
                farmer_id: format!("F-{:04}", i % FARMER_COUNT + 1),
                crop_type: CROP_TYPES[kind].to_string(),
                variety: VARIETIES[kind].to_string(),
                area_ha: 0.25 + (i % 5) as f64 * 0.25,
                planted_on,
                expected_harvest: (status != CropStatus::Damaged)
                    .then(|| planted_on.checked_add_days(Days::new(110)))
                    .flatten(),
                status,
            }
        })
        .collect()
}

pub fn reports() -> Vec<CropReport> {
    (0..REPORT_COUNT)
        .map(|i| {
            let damage_percentage = (10 + (i * 17) % 85) as f64;
            CropReport {
                id: format!("R-{:04}", i + 1),
                crop_id: format!("C-{:04}", (i * 5) % CROP_COUNT + 1),
                reported_on: days_after(120 + i * 4),
                damage_type: DAMAGE_TYPES[i % DAMAGE_TYPES.len()].to_string(),
                damage_percentage,
                estimated_loss: (damage_percentage * 450.0).round(),
                verified: i % 3 != 0,
            }
        })
        .collect()
}
