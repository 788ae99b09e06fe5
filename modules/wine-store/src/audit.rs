//! Read-only checks of a finished seed run.
//!
//! Each check is a count query against the built collections. Nothing here
//! writes, so it is safe to run against a live database.

use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use tracing::{info, warn};

use wine_common::error::{Result, SeedError};
use wine_common::{
    LookupDimension, RegionCleanup, Taster, POINTS, REGIONS_FIELD, REGION_1, REGION_2, TASTER_ID,
    TASTER_NAME,
};

use crate::WineStore;

#[derive(Debug, Default, Clone)]
pub struct AuditReport {
    pub tasters_checked: u64,
    pub violations: Vec<String>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Turn a report with violations into an error.
    pub fn into_result(self) -> Result<Self> {
        if self.is_clean() {
            Ok(self)
        } else {
            Err(SeedError::AuditFailed(self.violations))
        }
    }

    fn check(&mut self, count: u64, what: impl FnOnce(u64) -> String) {
        if count > 0 {
            self.violations.push(what(count));
        }
    }
}

pub async fn audit(store: &WineStore, mode: RegionCleanup) -> Result<AuditReport> {
    let mut report = AuditReport::default();
    let tastings = store.tastings();

    let stale = tastings
        .count_documents(doc! {
            "$or": [
                { REGION_1: { "$exists": true } },
                { REGION_2: { "$exists": true } },
            ]
        })
        .await?;
    report.check(stale, |n| format!("{n} tastings still carry region_1/region_2"));

    let oversized = tastings
        .count_documents(doc! { "regions.2": { "$exists": true } })
        .await?;
    report.check(oversized, |n| format!("{n} tastings have more than 2 regions"));

    if mode == RegionCleanup::Full {
        let with_null = tastings
            .count_documents(doc! {
                "$and": [
                    { REGIONS_FIELD: { "$type": "array" } },
                    { REGIONS_FIELD: null },
                ]
            })
            .await?;
        report.check(with_null, |n| format!("{n} tastings have a null region"));
    }

    let text_points = tastings
        .count_documents(doc! {
            TASTER_ID: { "$exists": true },
            POINTS: { "$type": "string" },
        })
        .await?;
    report.check(text_points, |n| format!("{n} linked tastings still have text points"));

    let tasters: Vec<Taster> = store.tasters().find(doc! {}).await?.try_collect().await?;
    for taster in &tasters {
        let linked = tastings
            .count_documents(doc! { TASTER_ID: taster.id })
            .await?;
        if linked != taster.tastings as u64 {
            report.violations.push(format!(
                "taster {} records {} tastings but {} are linked",
                taster.name, taster.tastings, linked
            ));
        }

        let mislinked = tastings
            .count_documents(doc! {
                TASTER_NAME: taster.name.as_str(),
                TASTER_ID: { "$ne": taster.id },
            })
            .await?;
        report.check(mislinked, |n| {
            format!("{n} tastings named {} do not point at their taster", taster.name)
        });
    }
    report.tasters_checked = tasters.len() as u64;

    for dimension in LookupDimension::ALL {
        let dupes: Vec<Document> = store
            .collection(dimension.collection())
            .aggregate(duplicate_names_pipeline())
            .await?
            .try_collect()
            .await?;
        report.check(dupes.len() as u64, |n| {
            format!("{n} duplicate names in {dimension}")
        });
    }

    if report.is_clean() {
        info!(tasters = report.tasters_checked, "Audit passed");
    } else {
        warn!(violations = report.violations.len(), "Audit found violations");
    }
    Ok(report)
}

fn duplicate_names_pipeline() -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$name", "n": { "$sum": 1 } } },
        doc! { "$match": { "n": { "$gt": 1 } } },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_report_passes_through() {
        let report = AuditReport {
            tasters_checked: 3,
            violations: vec![],
        };
        assert_eq!(report.into_result().unwrap().tasters_checked, 3);
    }

    #[test]
    fn zero_counts_are_not_violations() {
        let mut report = AuditReport::default();
        report.check(0, |n| format!("{n} bad"));
        report.check(2, |n| format!("{n} bad"));
        assert_eq!(report.violations, vec!["2 bad".to_string()]);
    }

    #[test]
    fn violations_become_audit_error() {
        let report = AuditReport {
            tasters_checked: 1,
            violations: vec!["1 tastings have a null region".into()],
        };
        match report.into_result() {
            Err(SeedError::AuditFailed(v)) => assert_eq!(v.len(), 1),
            other => panic!("expected AuditFailed, got {other:?}"),
        }
    }
}
