//! # Pretension Stress
//!
//! Direct elastic stress from pretensioning force, without the refined loss
//! machinery. The strand force is read from the force collaborator; the
//! section and eccentricity are those at release. Deck fibers carry no
//! pretension stress since the deck is cast after release.
//!
//! ```text
//! f_top = Σ ( -P/A - P·e/St )
//! f_bot = Σ ( -P/A - P·e/Sb )        summed over strand types present
//! ```
//!
//! Incremental stress in an interval is the cumulative stress at the end of
//! the interval less the cumulative stress at the end of the previous one.

use crate::errors::LossResult;
use crate::intervals::{IntervalAuthority, IntervalIndex, IntervalTime, ResultsType};
use crate::poi::PointOfInterest;
use crate::providers::{ForceProvider, SectionProvider, StressLocation};
use crate::strands::StrandType;

/// Magnitudes below this are reported as exactly zero (ksi)
pub const ZERO_STRESS_TOLERANCE: f64 = 1.0e-6;

fn normalize(value: f64) -> f64 {
    if value.abs() < ZERO_STRESS_TOLERANCE {
        0.0
    } else {
        value
    }
}

/// Stress from force `p` at eccentricity `e`, zero where the section does not exist
fn contribution(p: f64, e: f64, area: f64, modulus: f64) -> f64 {
    if area.abs() < f64::EPSILON || modulus.abs() < f64::EPSILON {
        return 0.0;
    }
    normalize(-p / area - p * e / modulus)
}

/// Top and bottom pretension stress at each POI, in POI order
pub fn pretension_stress<B>(
    broker: &B,
    interval: IntervalIndex,
    results: ResultsType,
    pois: &[PointOfInterest],
    top: StressLocation,
    bottom: StressLocation,
) -> LossResult<(Vec<f64>, Vec<f64>)>
where
    B: IntervalAuthority + SectionProvider + ForceProvider + ?Sized,
{
    match results {
        ResultsType::Cumulative => {
            let mut top_values = Vec::with_capacity(pois.len());
            let mut bottom_values = Vec::with_capacity(pois.len());
            for poi in pois {
                let (t, b) = cumulative_at(broker, interval, poi, top, bottom)?;
                top_values.push(t);
                bottom_values.push(b);
            }
            Ok((top_values, bottom_values))
        }
        ResultsType::Incremental => {
            let (top_end, bottom_end) =
                pretension_stress(broker, interval, ResultsType::Cumulative, pois, top, bottom)?;
            let Some(previous) = interval.previous() else {
                return Ok((top_end, bottom_end));
            };
            let (top_start, bottom_start) =
                pretension_stress(broker, previous, ResultsType::Cumulative, pois, top, bottom)?;
            let difference = |end: Vec<f64>, start: Vec<f64>| -> Vec<f64> {
                end.into_iter().zip(start).map(|(e, s)| normalize(e - s)).collect()
            };
            Ok((difference(top_end, top_start), difference(bottom_end, bottom_start)))
        }
    }
}

fn cumulative_at<B>(
    broker: &B,
    interval: IntervalIndex,
    poi: &PointOfInterest,
    top: StressLocation,
    bottom: StressLocation,
) -> LossResult<(f64, f64)>
where
    B: IntervalAuthority + SectionProvider + ForceProvider + ?Sized,
{
    let segment = poi.segment();
    let release = broker.release_interval(&segment)?;
    if interval < release {
        return Ok((0.0, 0.0));
    }

    let modulus = |location: StressLocation| -> LossResult<f64> {
        if location.is_deck() {
            Ok(0.0)
        } else {
            broker.section_modulus(release, poi, location)
        }
    };

    let mut top_stress = 0.0;
    let mut bottom_stress = 0.0;
    for strand_type in StrandType::ALL {
        if broker.strand_count(&segment, strand_type)? == 0 {
            continue;
        }
        let (e, effective_count) = broker.eccentricity(release, poi, strand_type)?;
        if effective_count <= 0.0 {
            continue;
        }
        let p = broker.pretension_force(poi, strand_type, interval, IntervalTime::End)?;
        let area = broker.area(release, poi)?;
        let st = modulus(top)?;
        let sb = modulus(bottom)?;
        top_stress += contribution(p, e, area, st);
        bottom_stress += contribution(p, e, area, sb);
    }
    Ok((normalize(top_stress), normalize(bottom_stress)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution() {
        assert_eq!(contribution(500.0, 10.0, 800.0, 5000.0), -1.625);
        assert_eq!(contribution(500.0, 10.0, 800.0, 4000.0), -1.875);
        assert_eq!(contribution(500.0, 10.0, 0.0, 4000.0), 0.0);
        assert_eq!(contribution(500.0, 10.0, 800.0, 0.0), 0.0);
    }

    #[test]
    fn test_normalize_clears_noise() {
        assert_eq!(normalize(-3.0e-9), 0.0);
        assert!(normalize(-3.0e-9).is_sign_positive());
        assert_eq!(normalize(0.25), 0.25);
    }
}
