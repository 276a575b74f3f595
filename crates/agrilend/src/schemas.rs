//! Listing schemas for the three record screens.
//!
//! Each record type implements [`Listing`], which ties it to its schema,
//! table variant, seed data and the filter that the date flags target.

use agrilend_browser::{
    ActionSpec, ActionVariant, Align, BulkActionSpec, ColumnSpec, FilterSpec, Result, Schema,
    TableVariant, Timestamp, Value,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::records::{Crop, CropReport, CropStatus, Ecosystem, Farmer, FarmerStatus};
use crate::seed;

/// A record type with a listing screen.
pub trait Listing: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Screen name used on the command line and in API paths.
    const NAME: &'static str;
    /// Singular noun for messages.
    const NOUN: &'static str;
    /// Date filter that `--on`, `--from` and `--to` apply to.
    const DATE_FILTER: &'static str;

    fn schema() -> Result<Schema<Self>>;

    fn variant() -> TableVariant;

    fn seed() -> Vec<Self>;
}

pub const CROP_TYPES: [&str; 4] = ["Rice", "Corn", "Vegetables", "Cassava"];

pub const DAMAGE_TYPES: [&str; 5] = [
    "Typhoon Damage",
    "Flood Damage",
    "Drought Stress",
    "Pest Infestation",
    "Fungal Disease",
];

/// Formats an amount in pesos with thousands separators.
pub fn peso(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if negative { "-" } else { "" };
    format!("{sign}₱{grouped}.{:02}", cents % 100)
}

pub fn day_label(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

fn day(date: NaiveDate) -> Value<'static> {
    Value::from(Timestamp::from_date(date))
}

impl Listing for Farmer {
    const NAME: &'static str = "farmers";
    const NOUN: &'static str = "farmer";
    const DATE_FILTER: &'static str = "registered_on";

    fn schema() -> Result<Schema<Self>> {
        let mut status = FilterSpec::select("status", "Status");
        for s in FarmerStatus::ALL {
            status = status.option(s.as_str(), s.as_str());
        }
        let mut ecosystem = FilterSpec::select("ecosystem", "Ecosystem");
        for e in Ecosystem::ALL {
            ecosystem = ecosystem.option(e.as_str(), e.as_str());
        }

        Schema::builder()
            .column(ColumnSpec::new("id", "ID", |f: &Farmer| Value::from(&f.id)))
            .column(ColumnSpec::new("name", "Name", |f: &Farmer| {
                Value::from(&f.name)
            }))
            .column(
                ColumnSpec::new("barangay", "Barangay", |f: &Farmer| {
                    Value::from(&f.barangay)
                })
                .group("location"),
            )
            .column(
                ColumnSpec::new("municipality", "Municipality", |f: &Farmer| {
                    Value::from(&f.municipality)
                })
                .group("location"),
            )
            .column(ColumnSpec::new("status", "Status", |f: &Farmer| {
                Value::from(f.status.as_str())
            }))
            .column(ColumnSpec::new("ecosystem", "Ecosystem", |f: &Farmer| {
                Value::from(f.ecosystem.as_str())
            }))
            .column(
                ColumnSpec::new("farm_area_ha", "Area (ha)", |f: &Farmer| {
                    Value::from(f.farm_area_ha)
                })
                .render(|f| format!("{:.2}", f.farm_area_ha))
                .sum(),
            )
            .column(
                ColumnSpec::new("loan_amount", "Loan", |f: &Farmer| {
                    Value::from(f.loan_amount)
                })
                .render(|f| peso(f.loan_amount))
                .sum(),
            )
            .column(
                ColumnSpec::new("registered_on", "Registered", |f: &Farmer| {
                    day(f.registered_on)
                })
                .render(|f| day_label(f.registered_on)),
            )
            .group("location", "Location")
            .filter(status)
            .filter(ecosystem)
            .filter(
                FilterSpec::text("municipality", "Municipality").placeholder("Any municipality"),
            )
            .filter(FilterSpec::date_range("registered_on", "Registered"))
            .action(ActionSpec::new("View", |f: &Farmer| {
                log::info!("viewing farmer {}", f.id)
            }))
            .action(ActionSpec::new("Edit", |f: &Farmer| {
                log::info!("editing farmer {}", f.id)
            }))
            .action(
                ActionSpec::new("Delete", |f: &Farmer| {
                    log::info!("delete requested for farmer {}", f.id)
                })
                .variant(ActionVariant::Danger),
            )
            .bulk_action(BulkActionSpec::new("Deactivate", |rows: &[&Farmer]| {
                log::info!("deactivating {} farmer(s)", rows.len())
            }))
            .totals_label("Total")
            .build()
    }

    fn variant() -> TableVariant {
        TableVariant::Selectable
    }

    fn seed() -> Vec<Self> {
        seed::farmers()
    }
}

impl Listing for Crop {
    const NAME: &'static str = "crops";
    const NOUN: &'static str = "crop";
    const DATE_FILTER: &'static str = "planted_on";

    fn schema() -> Result<Schema<Self>> {
        let mut crop_type = FilterSpec::select("crop_type", "Crop");
        for c in CROP_TYPES {
            crop_type = crop_type.option(c, c);
        }
        let mut status = FilterSpec::select("status", "Status");
        for s in CropStatus::ALL {
            status = status.option(s.as_str(), s.as_str());
        }

        Schema::builder()
            .column(ColumnSpec::new("id", "ID", |c: &Crop| Value::from(&c.id)))
            .column(ColumnSpec::new("farmer_id", "Farmer", |c: &Crop| {
                Value::from(&c.farmer_id)
            }))
            .column(
                ColumnSpec::new("crop_type", "Type", |c: &Crop| Value::from(&c.crop_type))
                    .group("crop"),
            )
            .column(
                ColumnSpec::new("variety", "Variety", |c: &Crop| Value::from(&c.variety))
                    .group("crop"),
            )
            .column(
                ColumnSpec::new("area_ha", "Area (ha)", |c: &Crop| Value::from(c.area_ha))
                    .render(|c| format!("{:.2}", c.area_ha))
                    .sum()
                    .group("crop"),
            )
            .column(
                ColumnSpec::new("planted_on", "Planted", |c: &Crop| day(c.planted_on))
                    .render(|c| day_label(c.planted_on))
                    .group("season"),
            )
            .column(
                ColumnSpec::new("expected_harvest", "Harvest", |c: &Crop| {
                    Value::from(c.expected_harvest.map(Timestamp::from_date))
                })
                .render(|c| c.expected_harvest.map(day_label).unwrap_or_default())
                .group("season"),
            )
            .column(ColumnSpec::new("status", "Status", |c: &Crop| {
                Value::from(c.status.as_str())
            }))
            .group("crop", "Crop")
            .group("season", "Season")
            .filter(crop_type)
            .filter(status)
            .filter(FilterSpec::text("farmer_id", "Farmer ID"))
            .filter(FilterSpec::date_range("planted_on", "Planted"))
            .action(ActionSpec::new("View", |c: &Crop| {
                log::info!("viewing crop {}", c.id)
            }))
            .action(ActionSpec::new("Report damage", |c: &Crop| {
                log::info!("damage report started for crop {}", c.id)
            }))
            .build()
    }

    fn variant() -> TableVariant {
        TableVariant::Grouped
    }

    fn seed() -> Vec<Self> {
        seed::crops()
    }
}

impl Listing for CropReport {
    const NAME: &'static str = "reports";
    const NOUN: &'static str = "report";
    const DATE_FILTER: &'static str = "reported_on";

    fn schema() -> Result<Schema<Self>> {
        let mut damage_type = FilterSpec::select("damage_type", "Damage");
        for d in DAMAGE_TYPES {
            damage_type = damage_type.option(d, d);
        }

        Schema::builder()
            .column(ColumnSpec::new("id", "ID", |r: &CropReport| {
                Value::from(&r.id)
            }))
            .column(ColumnSpec::new("crop_id", "Crop", |r: &CropReport| {
                Value::from(&r.crop_id)
            }))
            .column(
                ColumnSpec::new("reported_on", "Reported", |r: &CropReport| {
                    day(r.reported_on)
                })
                .render(|r| day_label(r.reported_on)),
            )
            .column(
                ColumnSpec::new("damage_type", "Type", |r: &CropReport| {
                    Value::from(&r.damage_type)
                })
                .group("damage"),
            )
            .column(
                ColumnSpec::new("damage_percentage", "Extent", |r: &CropReport| {
                    Value::from(r.damage_percentage)
                })
                .render(|r| format!("{:.0}%", r.damage_percentage))
                .align(Align::Right)
                .group("damage"),
            )
            .column(
                ColumnSpec::new("estimated_loss", "Est. loss", |r: &CropReport| {
                    Value::from(r.estimated_loss)
                })
                .render(|r| peso(r.estimated_loss))
                .sum()
                .group("damage"),
            )
            .column(
                ColumnSpec::new("verified", "Verified", |r: &CropReport| {
                    Value::from(r.verified)
                })
                .display("true", "Yes")
                .display("false", "No"),
            )
            .group("damage", "Damage")
            .filter(damage_type)
            .filter(
                FilterSpec::select("verified", "Verified")
                    .option("Verified", "true")
                    .option("Unverified", "false"),
            )
            .filter(FilterSpec::date_range("reported_on", "Reported"))
            .action(ActionSpec::new("View", |r: &CropReport| {
                log::info!("viewing report {}", r.id)
            }))
            .bulk_action(BulkActionSpec::new("Verify", |rows: &[&CropReport]| {
                log::info!("verifying {} report(s)", rows.len())
            }))
            .totals_label("Total losses")
            .build()
    }

    fn variant() -> TableVariant {
        TableVariant::Report
    }

    fn seed() -> Vec<Self> {
        seed::reports()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peso_groups_thousands() {
        assert_eq!(peso(0.0), "₱0.00");
        assert_eq!(peso(999.5), "₱999.50");
        assert_eq!(peso(1_234_567.891), "₱1,234,567.89");
        assert_eq!(peso(-15000.0), "-₱15,000.00");
    }

    #[test]
    fn schemas_build() {
        assert_eq!(Farmer::schema().unwrap().columns().len(), 9);
        assert_eq!(Crop::schema().unwrap().header_groups().len(), 4);
        let reports = CropReport::schema().unwrap();
        assert_eq!(reports.totals_label(), "Total losses");
    }

    #[test]
    fn date_filters_exist_in_schema() {
        let farmers = Farmer::schema().unwrap();
        assert!(farmers.filter(Farmer::DATE_FILTER).is_some());
        let crops = Crop::schema().unwrap();
        assert!(crops.filter(Crop::DATE_FILTER).is_some());
        let reports = CropReport::schema().unwrap();
        assert!(reports.filter(CropReport::DATE_FILTER).is_some());
    }

    #[test]
    fn verified_renders_as_yes_no() {
        let schema = CropReport::schema().unwrap();
        let report = &CropReport::seed()[0];
        let text = schema.column("verified").unwrap().display_text(report);
        assert!(text == "Yes" || text == "No");
    }
}
