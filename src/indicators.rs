//! Homepage aggregates: headline indicators and the farm-population pyramid.

use serde::Deserialize;

/// One year of island-wide farm statistics.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct IndicatorRow {
    pub year: u16,
    pub households: f64,
    pub farm_population: f64,
    pub cultivated_area: f64,
    pub citrus_production: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Indicator {
    pub label: &'static str,
    pub unit: &'static str,
    pub year: u16,
    pub value: f64,
    /// Percent change against the previous year, when there is one.
    pub change: Option<f64>,
}

const FIELDS: [(&str, &str, fn(&IndicatorRow) -> f64); 4] = [
    ("농가수", "가구", |r| r.households),
    ("농가인구", "명", |r| r.farm_population),
    ("경지면적", "ha", |r| r.cultivated_area),
    ("감귤 생산량", "톤", |r| r.citrus_production),
];

/// Latest value and year-over-year change for each headline figure.
pub fn summarize(rows: &[IndicatorRow]) -> Vec<Indicator> {
    let mut sorted: Vec<&IndicatorRow> = rows.iter().collect();
    sorted.sort_by_key(|r| r.year);
    let Some(&latest) = sorted.last() else {
        return Vec::new();
    };
    let previous = sorted.len().checked_sub(2).map(|i| sorted[i]);
    FIELDS
        .iter()
        .map(|&(label, unit, get)| {
            let value = get(latest);
            let change = previous
                .map(get)
                .filter(|prev| *prev != 0.0)
                .map(|prev| (value - prev) / prev * 100.0);
            Indicator { label, unit, year: latest.year, value, change }
        })
        .collect()
}

/// `(year, value)` points of one headline figure, oldest first.
pub fn series(rows: &[IndicatorRow], label: &str) -> Vec<(f64, f64)> {
    let Some((_, _, get)) = FIELDS.iter().find(|(l, _, _)| *l == label) else {
        return Vec::new();
    };
    let mut points: Vec<(f64, f64)> = rows.iter().map(|r| (r.year as f64, get(r))).collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    points
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Cohort {
    pub age: String,
    pub male: u32,
    pub female: u32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PyramidYear {
    pub year: u16,
    pub cohorts: Vec<Cohort>,
}

impl PyramidYear {
    pub fn total(&self) -> u64 {
        self.cohorts.iter().map(|c| c.male as u64 + c.female as u64).sum()
    }

    /// Share of people aged 65 and over, in percent.
    pub fn elderly_share(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let elderly: u64 = self
            .cohorts
            .iter()
            .filter(|c| c.age.split(['-', '+']).next().and_then(|a| a.parse::<u32>().ok()).is_some_and(|a| a >= 65))
            .map(|c| c.male as u64 + c.female as u64)
            .sum();
        elderly as f64 / total as f64 * 100.0
    }

    pub fn widest(&self) -> u32 {
        self.cohorts.iter().map(|c| c.male.max(c.female)).max().unwrap_or(0)
    }
}
