/// Plan sheet writer - the CSV sink the planning template is filled from.
///
/// One row per final segment. Batch runs write several sheets into the same
/// table, distinguished by the `sheet` column.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use clap::ValueEnum;
use csv::Writer;
use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::segment::{round2, Direction, FinalSegment};

pub const DEFAULT_REST_MINUTES: i64 = 10;
pub const DEFAULT_EVERY_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Section {
    Colonia,
    Manada,
    #[default]
    Scout,
    UnidadEsculta,
    ClanRovers,
}

impl Section {
    pub fn label(&self) -> &'static str {
        match self {
            Section::Colonia => "Colonia",
            Section::Manada => "Manada",
            Section::Scout => "Scout",
            Section::UnidadEsculta => "Unidad Esculta",
            Section::ClanRovers => "Clan/Rovers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preparation {
    MuyBaja,
    Baja,
    #[default]
    Media,
    Alta,
    MuyAlta,
}

impl Preparation {
    pub fn label(&self) -> &'static str {
        match self {
            Preparation::MuyBaja => "Muy baja",
            Preparation::Baja => "Baja",
            Preparation::Media => "Media",
            Preparation::Alta => "Alta",
            Preparation::MuyAlta => "Muy alta",
        }
    }
}

/// Plan header fields copied onto every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanSettings {
    pub section: Section,
    pub preparation: Preparation,
    /// Rest length in minutes.
    pub rest_minutes: i64,
    /// Walking time between rests in minutes. Always >= 1.
    pub every_minutes: i64,
}

impl Default for PlanSettings {
    fn default() -> Self {
        PlanSettings {
            section: Section::default(),
            preparation: Preparation::default(),
            rest_minutes: DEFAULT_REST_MINUTES,
            every_minutes: DEFAULT_EVERY_MINUTES,
        }
    }
}

impl PlanSettings {
    pub fn new(section: Section, preparation: Preparation, rest_minutes: i64, every_minutes: i64) -> Self {
        PlanSettings {
            section,
            preparation,
            rest_minutes,
            every_minutes: if every_minutes <= 0 { 1 } else { every_minutes },
        }
    }
}

/// Final segments of one track, under the sheet name they are written as.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSheet {
    pub name: String,
    pub segments: Vec<FinalSegment>,
}

#[derive(Debug, Serialize)]
struct PlanRow<'a> {
    sheet: &'a str,
    section: &'static str,
    preparation: &'static str,
    rest_minutes: i64,
    every_minutes: i64,
    segment: usize,
    distance_km: f64,
    kind: &'static str,
    elevation_m: f64,
    slope_percent: f64,
}

/// Label used in the planning template for a direction.
pub fn kind_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Ascent => "Ascenso",
        Direction::Descent => "Descenso",
        Direction::Flat => "Llano",
    }
}

pub fn write_plan<W: Write>(writer: W, sheets: &[PlanSheet], settings: &PlanSettings) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    for sheet in sheets {
        for segment in &sheet.segments {
            wtr.serialize(PlanRow {
                sheet: &sheet.name,
                section: settings.section.label(),
                preparation: settings.preparation.label(),
                rest_minutes: settings.rest_minutes,
                every_minutes: settings.every_minutes,
                segment: segment.index,
                distance_km: round2(segment.distance_m / 1000.0),
                kind: kind_label(segment.direction),
                elevation_m: segment.elevation_m.abs(),
                slope_percent: segment.slope_percent,
            })?;
        }
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_plan_to_path(path: &Path, sheets: &[PlanSheet], settings: &PlanSettings) -> Result<()> {
    let file = File::create(path)?;
    write_plan(file, sheets, settings)
}

/// Sheet name for a track file stem: accents stripped, lowercased, then
/// title-cased. Also the batch sort key.
pub fn normalize_sheet_name(stem: &str) -> String {
    let folded: String = stem
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    let mut name = String::with_capacity(folded.len());
    let mut previous_is_letter = false;
    for c in folded.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                name.extend(c.to_lowercase());
            } else {
                name.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            name.push(c);
            previous_is_letter = false;
        }
    }
    name
}
