//! # Loss CLI
//!
//! Runs the loss engine over a girder and prints a loss summary table,
//! pretension stresses, and the midspan loss details as JSON.
//!
//! ```text
//! loss_cli                  # built-in 100 ft Type IV girder
//! loss_cli scenario.json    # girder from a JSON scenario
//! ```
//!
//! A scenario is a girder model whose fields override the built-in one, e.g.
//!
//! ```json
//! { "beam_type": "SplicedIBeam", "segment_lengths_ft": [80.0, 80.0] }
//! ```
//!
//! Errors are printed to stdout as JSON and the process exits with status 1.

mod logging;

use std::rc::Rc;

use tracing::{error, info};

use loss_core::intervals::{IntervalIndex, IntervalSelector, ResultsType};
use loss_core::providers::{StressLocation, TendonEnd};
use loss_core::report::LossTableReporter;
use loss_core::{GirderModel, LossEngineer, LossError, LossResult};

fn load_scenario(path: Option<String>) -> LossResult<GirderModel> {
    let Some(path) = path else {
        return Ok(GirderModel::default());
    };
    let text = std::fs::read_to_string(&path).map_err(|e| {
        LossError::invalid_input("scenario", path.clone(), e.to_string())
    })?;
    Ok(serde_json::from_str(&text)?)
}

fn run() -> LossResult<()> {
    let model = Rc::new(load_scenario(std::env::args().nth(1))?);
    let mut engineer = LossEngineer::new(model.beam_type, Rc::downgrade(&model))?;
    let pois = model.pois();
    let last = IntervalIndex(model.intervals.len().saturating_sub(1));

    println!("Prestress Losses - {}", engineer.method().display_name());
    println!("═══════════════════════════════════════════════════════════════════════");

    let mut table = LossTableReporter::new();
    engineer.report_final_losses(&pois, &mut table)?;
    if let Some(row) = table.final_rows.first() {
        println!("Per {}", row.references.join(", "));
    }
    if let Some(fpt) = table.constant_fpt_ksi {
        println!("fpt = {:.2} ksi at every location", fpt);
    }
    println!(
        "{:<22} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Location", "x (ft)", "ES", "Creep", "Shrink", "Relax", "Lump", "PT", "Total"
    );
    for row in &table.final_rows {
        println!(
            "{:<22} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2}",
            row.location,
            row.dist_from_start_ft,
            row.elastic_shortening_ksi,
            row.creep_ksi,
            row.shrinkage_ksi,
            row.relaxation_before_deck_ksi + row.relaxation_after_deck_ksi,
            row.lump_sum_ksi,
            row.friction_ksi + row.anchor_set_ksi,
            row.total_ksi,
        );
    }
    println!();

    let (top, bottom) = engineer.get_pretension_stress(
        last,
        ResultsType::Cumulative,
        &pois,
        StressLocation::TopGirder,
        StressLocation::BottomGirder,
    )?;
    println!("Pretension stress at end of {} (ksi)", last);
    for ((poi, t), b) in pois.iter().zip(&top).zip(&bottom) {
        println!("  {:<32} top {:>7.3}  bottom {:>7.3}", poi.to_string(), t, b);
    }
    println!();

    let girder = model.girder;
    for duct in 0..model.girder_tendons.len() {
        let Some(average) =
            engineer.get_girder_tendon_average_friction_and_anchor_set_loss(girder, duct)?
        else {
            break;
        };
        let left = engineer
            .get_girder_tendon_elongation(girder, duct, TendonEnd::Left)?
            .unwrap_or(0.0);
        let right = engineer
            .get_girder_tendon_elongation(girder, duct, TendonEnd::Right)?
            .unwrap_or(0.0);
        println!(
            "Duct {}: avg friction {:.2} ksi, avg anchor set {:.2} ksi, elongation {:.2} in / {:.2} in",
            duct + 1,
            average.friction_ksi,
            average.anchor_set_ksi,
            left,
            right
        );
    }

    if let Some(midspan) = pois.get(pois.len() / 2) {
        let details = engineer.get_losses(midspan, IntervalSelector::AllIntervals)?;
        println!("{}", serde_json::to_string_pretty(&*details)?);
    }

    info!(stats = ?engineer.cache_stats(), "done");
    Ok(())
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        error!(code = e.error_code(), "{}", e);
        match serde_json::to_string_pretty(&e) {
            Ok(json) => println!("{}", json),
            Err(_) => println!("{}", e),
        }
        std::process::exit(1);
    }
}
