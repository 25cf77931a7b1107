//! Per-facility and per-job counts collected during a run

use colored::*;

/// Counts for one (mapping, table) job of a facility
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSummary {
    pub table: String,
    pub mapping: String,
    /// Data rows read from the worksheet
    pub fetched: usize,
    pub inserted: u64,
    /// Rows without a matching language mapping
    pub skipped: usize,
    /// Rows removed by the pre-insert delete, `None` when no delete ran
    pub deleted: Option<u64>,
}

/// Outcome of one facility
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacilityStatus {
    Imported,
    /// Skipped because of a configuration problem
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilitySummary {
    pub corporation: String,
    pub facility: String,
    pub facility_code: Option<i64>,
    pub status: FacilityStatus,
    pub jobs: Vec<JobSummary>,
}

impl FacilitySummary {
    pub fn imported(corporation: &str, facility: &str, facility_code: i64, jobs: Vec<JobSummary>) -> Self {
        FacilitySummary {
            corporation: corporation.to_string(),
            facility: facility.to_string(),
            facility_code: Some(facility_code),
            status: FacilityStatus::Imported,
            jobs,
        }
    }

    pub fn skipped(corporation: &str, facility: &str, reason: impl Into<String>) -> Self {
        FacilitySummary {
            corporation: corporation.to_string(),
            facility: facility.to_string(),
            facility_code: None,
            status: FacilityStatus::Skipped(reason.into()),
            jobs: Vec::new(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, FacilityStatus::Skipped(_))
    }

    pub fn inserted(&self) -> u64 {
        self.jobs.iter().map(|j| j.inserted).sum()
    }
}

/// Everything that happened in one run, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub facilities: Vec<FacilitySummary>,
}

impl RunSummary {
    pub fn push(&mut self, facility: FacilitySummary) {
        self.facilities.push(facility);
    }

    pub fn imported_count(&self) -> usize {
        self.facilities.iter().filter(|f| !f.is_skipped()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.facilities.iter().filter(|f| f.is_skipped()).count()
    }

    pub fn total_inserted(&self) -> u64 {
        self.facilities.iter().map(FacilitySummary::inserted).sum()
    }

    /// Find a facility by corporation and name
    pub fn facility(&self, corporation: &str, facility: &str) -> Option<&FacilitySummary> {
        self.facilities
            .iter()
            .find(|f| f.corporation == corporation && f.facility == facility)
    }

    /// Print the summary table to stdout
    pub fn print(&self) {
        println!();
        println!("{}", "Import summary".bold());

        for facility in &self.facilities {
            let name = format!("{}.{}", facility.corporation, facility.facility);
            match &facility.status {
                FacilityStatus::Skipped(reason) => {
                    println!("  {} {} {}", "skip".yellow(), name.cyan(), reason.dimmed());
                }
                FacilityStatus::Imported => {
                    let code = facility
                        .facility_code
                        .map(|c| c.to_string())
                        .unwrap_or_default();
                    println!("  {} {} ({})", "ok".green(), name.cyan(), code);
                    for job in &facility.jobs {
                        let deleted = match job.deleted {
                            Some(n) => format!("deleted {}", n),
                            None => "no delete".to_string(),
                        };
                        println!(
                            "      {} [{}] fetched {}, inserted {}, skipped {}, {}",
                            job.table,
                            job.mapping.dimmed(),
                            job.fetched,
                            job.inserted.to_string().bright_green(),
                            job.skipped,
                            deleted
                        );
                    }
                }
            }
        }

        println!(
            "{} facilities imported, {} skipped, {} rows inserted",
            self.imported_count().to_string().bright_green().bold(),
            self.skipped_count().to_string().yellow(),
            self.total_inserted()
        );
    }
}
