//! # Reference Girder Model
//!
//! A self-contained girder that implements every collaborator trait, for
//! demonstrations, JSON scenarios and tests.
//!
//! ## Assumptions
//!
//! - Prismatic precast section; each segment spans simply between its ends
//! - Deck acts compositely from the composite deck interval onward
//! - Ec = 1820·√f'c (ksi), normal weight concrete
//! - Harped strands are straight from the ends to harp points at 0.4L
//! - Tendon profiles are parabolas between the girder (or segment) ends
//! - Concrete age is measured from casting, the same day for all segments
//! - Strand force carries every pretension loss through the end of the
//!   interval, evaluated with the model's own criteria and beam type
//!
//! ```text
//!        deck    ┌────────────────────────────────┐
//!                └──┬──────────────────────────┬──┘
//!   girder          │   ●  ●  harped           │
//!                   │ ●●●●●●●●●●  straight     │
//!                   └──────────────────────────┘
//!                   |<---------- L ----------->|
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::GirderConfiguration;
use crate::criteria::LossCriteria;
use crate::errors::{LossError, LossResult};
use crate::intervals::{IntervalAuthority, IntervalIndex, IntervalTime};
use crate::poi::{GirderKey, PoiId, PointOfInterest, SegmentKey};
use crate::providers::{
    DeckInputs, DuctData, ForceProvider, JackingEnd, LossInputProvider, LossInputs, SectionProvider,
    StressLocation, TendonProvider, TendonScope, TendonStation,
};
use crate::strands::{StrandMaterial, StrandType};
use crate::strategy::{BeamType, LossStrategy};

/// POIs generated per segment (tenth points)
pub const POIS_PER_SEGMENT: usize = 11;
/// Profile stations generated per tendon
pub const TENDON_STATIONS: usize = 11;

/// Modulus of elasticity of normal weight concrete (ksi)
pub fn concrete_modulus_ksi(fc_ksi: f64) -> f64 {
    1820.0 * fc_ksi.max(0.0).sqrt()
}

/// Precast girder cross section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GirderSection {
    pub area_in2: f64,
    pub inertia_in4: f64,
    /// Centroid above the bottom fiber
    pub yb_in: f64,
    pub height_in: f64,
    pub vs_ratio_in: f64,
    /// Unit weight including reinforcement (kcf)
    pub unit_weight_kcf: f64,
}

impl Default for GirderSection {
    /// AASHTO Type IV
    fn default() -> Self {
        GirderSection {
            area_in2: 789.0,
            inertia_in4: 260_730.0,
            yb_in: 24.73,
            height_in: 54.0,
            vs_ratio_in: 3.5,
            unit_weight_kcf: 0.155,
        }
    }
}

/// Cast-in-place deck carried by the girder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckModel {
    pub thickness_in: f64,
    pub effective_width_in: f64,
    pub fc_ksi: f64,
    pub unit_weight_kcf: f64,
    /// Barriers and overlay on the composite section (kip/ft)
    pub superimposed_kip_per_ft: f64,
}

impl Default for DeckModel {
    fn default() -> Self {
        DeckModel {
            thickness_in: 8.0,
            effective_width_in: 96.0,
            fc_ksi: 4.0,
            unit_weight_kcf: 0.150,
            superimposed_kip_per_ft: 0.3,
        }
    }
}

/// Strand centroids above the bottom of the girder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrandLayout {
    pub straight_cg_in: f64,
    pub harped_end_cg_in: f64,
    pub harped_mid_cg_in: f64,
    pub temporary_cg_in: f64,
}

impl Default for StrandLayout {
    fn default() -> Self {
        StrandLayout {
            straight_cg_in: 5.0,
            harped_end_cg_in: 40.0,
            harped_mid_cg_in: 8.0,
            temporary_cg_in: 50.0,
        }
    }
}

/// A construction stage; days are measured from casting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalSpan {
    pub description: String,
    pub start_day: f64,
    pub end_day: f64,
}

impl IntervalSpan {
    pub fn new(description: &str, start_day: f64, end_day: f64) -> Self {
        IntervalSpan {
            description: description.to_string(),
            start_day,
            end_day,
        }
    }
}

/// Parabolic tendon in one duct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TendonModel {
    pub strand_count: usize,
    pub jacking_force_kip: f64,
    pub jacking_end: JackingEnd,
    /// Duct centroid above the bottom of the girder at the ends
    pub end_cg_in: f64,
    /// Duct centroid above the bottom of the girder at midlength
    pub low_cg_in: f64,
}

impl TendonModel {
    /// Stations along a tendon of the given length
    fn stations(&self, length_ft: f64) -> Vec<TendonStation> {
        let sag_ft = (self.end_cg_in - self.low_cg_in) / 12.0;
        (0..TENDON_STATIONS)
            .map(|i| {
                let x_ft = length_ft * i as f64 / (TENDON_STATIONS - 1) as f64;
                TendonStation {
                    x_ft,
                    alpha_rad: 8.0 * sag_ft.abs() * x_ft / (length_ft * length_ft),
                }
            })
            .collect()
    }
}

/// Tendon local to one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentTendon {
    pub segment: usize,
    pub tendon: TendonModel,
}

/// Reference girder implementing every collaborator trait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GirderModel {
    pub girder: GirderKey,
    pub beam_type: BeamType,
    pub segment_lengths_ft: Vec<f64>,
    pub section: GirderSection,
    pub deck: DeckModel,
    pub strand: StrandMaterial,
    pub layout: StrandLayout,
    /// Persisted strand layout and concrete strengths, shared by all segments
    pub configuration: GirderConfiguration,
    pub criteria: LossCriteria,
    pub relative_humidity_pct: f64,
    pub intervals: Vec<IntervalSpan>,
    pub release_interval: IntervalIndex,
    pub composite_deck_interval: IntervalIndex,
    pub temporary_strand_removal_interval: Option<IntervalIndex>,
    pub tendon_stressing_interval: IntervalIndex,
    pub tendon_strand: StrandMaterial,
    pub girder_tendons: Vec<TendonModel>,
    pub segment_tendons: Vec<SegmentTendon>,
}

impl Default for GirderModel {
    /// 100 ft pretensioned Type IV girder
    fn default() -> Self {
        GirderModel {
            girder: GirderKey::new(0, 0),
            beam_type: BeamType::IBeam,
            segment_lengths_ft: vec![100.0],
            section: GirderSection::default(),
            deck: DeckModel::default(),
            strand: StrandMaterial::default(),
            layout: StrandLayout::default(),
            configuration: GirderConfiguration::default(),
            criteria: LossCriteria::default(),
            relative_humidity_pct: 75.0,
            intervals: vec![
                IntervalSpan::new("Cast and cure", 0.0, 1.0),
                IntervalSpan::new("Release prestress", 1.0, 1.0),
                IntervalSpan::new("Storage", 1.0, 60.0),
                IntervalSpan::new("Erect girder", 60.0, 90.0),
                IntervalSpan::new("Cast deck", 90.0, 120.0),
                IntervalSpan::new("Barriers and overlay", 120.0, 150.0),
                IntervalSpan::new("Final", 150.0, 2000.0),
            ],
            release_interval: IntervalIndex(1),
            composite_deck_interval: IntervalIndex(4),
            temporary_strand_removal_interval: Some(IntervalIndex(3)),
            tendon_stressing_interval: IntervalIndex(3),
            tendon_strand: StrandMaterial::default(),
            girder_tendons: Vec::new(),
            segment_tendons: Vec::new(),
        }
    }
}

/// Composite section properties
#[derive(Debug, Clone, Copy)]
struct Composite {
    area_in2: f64,
    inertia_in4: f64,
    yb_in: f64,
    deck_area_in2: f64,
    deck_eccentricity_in: f64,
}

impl GirderModel {
    /// Two 80 ft segments spliced with two girder tendons and one segment tendon
    pub fn spliced_demo() -> Self {
        GirderModel {
            beam_type: BeamType::SplicedIBeam,
            segment_lengths_ft: vec![80.0, 80.0],
            girder_tendons: vec![
                TendonModel {
                    strand_count: 12,
                    jacking_force_kip: 12.0 * 0.153 * 0.75 * 270.0,
                    jacking_end: JackingEnd::Both,
                    end_cg_in: 36.0,
                    low_cg_in: 6.0,
                },
                TendonModel {
                    strand_count: 12,
                    jacking_force_kip: 12.0 * 0.153 * 0.75 * 270.0,
                    jacking_end: JackingEnd::Left,
                    end_cg_in: 30.0,
                    low_cg_in: 10.0,
                },
            ],
            segment_tendons: vec![SegmentTendon {
                segment: 0,
                tendon: TendonModel {
                    strand_count: 6,
                    jacking_force_kip: 6.0 * 0.153 * 0.75 * 270.0,
                    jacking_end: JackingEnd::Right,
                    end_cg_in: 20.0,
                    low_cg_in: 12.0,
                },
            }],
            ..Default::default()
        }
    }

    pub fn segment_keys(&self) -> Vec<SegmentKey> {
        (0..self.segment_lengths_ft.len())
            .map(|s| SegmentKey::new(self.girder.group, self.girder.girder, s))
            .collect()
    }

    /// POIs at tenth points of every segment. Identities are derived from
    /// the location so repeated calls return the same POIs.
    pub fn pois(&self) -> Vec<PointOfInterest> {
        let mut pois = Vec::new();
        for (s, length) in self.segment_lengths_ft.iter().enumerate() {
            let segment = SegmentKey::new(self.girder.group, self.girder.girder, s);
            for i in 0..POIS_PER_SEGMENT {
                let key = ((self.girder.group as u128) << 96)
                    | ((self.girder.girder as u128) << 64)
                    | ((s as u128) << 32)
                    | i as u128;
                pois.push(PointOfInterest::with_id(
                    PoiId(Uuid::from_u128(key)),
                    segment,
                    length * i as f64 / (POIS_PER_SEGMENT - 1) as f64,
                ));
            }
        }
        pois
    }

    fn segment_length(&self, segment: &SegmentKey) -> LossResult<f64> {
        if segment.girder_key() != self.girder {
            return Err(LossError::location_not_found(
                segment.to_string(),
                format!("model describes {}", self.girder),
            ));
        }
        self.segment_lengths_ft
            .get(segment.segment)
            .copied()
            .ok_or_else(|| {
                LossError::location_not_found(
                    segment.to_string(),
                    format!("girder has {} segments", self.segment_lengths_ft.len()),
                )
            })
    }

    fn check_interval(&self, interval: IntervalIndex) -> LossResult<&IntervalSpan> {
        self.intervals.get(interval.0).ok_or_else(|| {
            LossError::invalid_input(
                "interval",
                interval.0.to_string(),
                format!("only {} intervals are defined", self.intervals.len()),
            )
        })
    }

    fn is_composite(&self, interval: IntervalIndex) -> bool {
        interval >= self.composite_deck_interval
    }

    fn composite(&self, fc_ksi: f64) -> Composite {
        let g = &self.section;
        let d = &self.deck;
        let modular = concrete_modulus_ksi(d.fc_ksi) / concrete_modulus_ksi(fc_ksi);
        let deck_width = d.effective_width_in * modular;
        let deck_area = deck_width * d.thickness_in;
        let deck_y = g.height_in + d.thickness_in / 2.0;
        let area = g.area_in2 + deck_area;
        let yb = (g.area_in2 * g.yb_in + deck_area * deck_y) / area;
        let inertia = g.inertia_in4
            + g.area_in2 * (yb - g.yb_in).powi(2)
            + deck_width * d.thickness_in.powi(3) / 12.0
            + deck_area * (deck_y - yb).powi(2);
        Composite {
            area_in2: area,
            inertia_in4: inertia,
            yb_in: yb,
            deck_area_in2: deck_area,
            deck_eccentricity_in: deck_y - yb,
        }
    }

    /// Strand group centroid above the bottom at a distance along the segment
    fn strand_cg_in(&self, strand_type: StrandType, x_ft: f64, length_ft: f64) -> f64 {
        let l = &self.layout;
        match strand_type {
            StrandType::Straight => l.straight_cg_in,
            StrandType::Temporary => l.temporary_cg_in,
            StrandType::Harped => {
                let harp = 0.4 * length_ft;
                let from_end = x_ft.min(length_ft - x_ft).max(0.0);
                if harp <= 0.0 || from_end >= harp {
                    l.harped_mid_cg_in
                } else {
                    l.harped_end_cg_in + (l.harped_mid_cg_in - l.harped_end_cg_in) * from_end / harp
                }
            }
        }
    }

    /// Simple span moment from a uniform load (kip-in)
    fn moment_kip_in(w_kip_per_ft: f64, x_ft: f64, length_ft: f64) -> f64 {
        w_kip_per_ft * x_ft * (length_ft - x_ft) / 2.0 * 12.0
    }

    fn girder_length_ft(&self) -> f64 {
        self.segment_lengths_ft.iter().sum()
    }

    /// Tendon and its length for a scope
    fn tendon(&self, scope: &TendonScope, duct: usize) -> LossResult<(&TendonModel, f64)> {
        let not_found = || {
            LossError::location_not_found(format!("{} duct {}", scope, duct + 1), "no such duct")
        };
        match scope {
            TendonScope::Girder(key) if *key == self.girder => self
                .girder_tendons
                .get(duct)
                .map(|t| (t, self.girder_length_ft()))
                .ok_or_else(not_found),
            TendonScope::Segment(key) => {
                let length = self.segment_length(key)?;
                self.segment_tendons
                    .iter()
                    .filter(|t| t.segment == key.segment)
                    .nth(duct)
                    .map(|t| (&t.tendon, length))
                    .ok_or_else(not_found)
            }
            _ => Err(not_found()),
        }
    }
}

impl IntervalAuthority for GirderModel {
    fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    fn release_interval(&self, segment: &SegmentKey) -> LossResult<IntervalIndex> {
        self.segment_length(segment)?;
        Ok(self.release_interval)
    }

    fn composite_deck_interval(&self) -> IntervalIndex {
        self.composite_deck_interval
    }

    fn temporary_strand_removal_interval(&self, _segment: &SegmentKey) -> Option<IntervalIndex> {
        self.temporary_strand_removal_interval
    }

    fn tendon_stressing_interval(&self, _scope: &TendonScope) -> LossResult<IntervalIndex> {
        Ok(self.tendon_stressing_interval)
    }

    fn concrete_age_days(
        &self,
        segment: &SegmentKey,
        interval: IntervalIndex,
        time: IntervalTime,
    ) -> LossResult<f64> {
        self.segment_length(segment)?;
        let span = self.check_interval(interval)?;
        Ok(match time {
            IntervalTime::Start => span.start_day,
            IntervalTime::Middle => 0.5 * (span.start_day + span.end_day),
            IntervalTime::End => span.end_day,
        })
    }
}

impl SectionProvider for GirderModel {
    fn area(&self, interval: IntervalIndex, poi: &PointOfInterest) -> LossResult<f64> {
        self.segment_length(&poi.segment())?;
        Ok(if self.is_composite(interval) {
            self.composite(self.configuration.fc_ksi).area_in2
        } else {
            self.section.area_in2
        })
    }

    fn section_modulus(
        &self,
        interval: IntervalIndex,
        poi: &PointOfInterest,
        location: StressLocation,
    ) -> LossResult<f64> {
        self.segment_length(&poi.segment())?;
        let h = self.section.height_in;
        if !self.is_composite(interval) {
            return Ok(match location {
                StressLocation::TopGirder => -self.section.inertia_in4 / (h - self.section.yb_in),
                StressLocation::BottomGirder => self.section.inertia_in4 / self.section.yb_in,
                StressLocation::TopDeck | StressLocation::BottomDeck => 0.0,
            });
        }
        let c = self.composite(self.configuration.fc_ksi);
        Ok(match location {
            StressLocation::TopGirder | StressLocation::BottomDeck => -c.inertia_in4 / (h - c.yb_in),
            StressLocation::BottomGirder => c.inertia_in4 / c.yb_in,
            StressLocation::TopDeck => -c.inertia_in4 / (h + self.deck.thickness_in - c.yb_in),
        })
    }

    fn eccentricity(
        &self,
        interval: IntervalIndex,
        poi: &PointOfInterest,
        strand_type: StrandType,
    ) -> LossResult<(f64, f64)> {
        let length = self.segment_length(&poi.segment())?;
        let cg = self.strand_cg_in(strand_type, poi.dist_from_start_ft(), length);
        let yb = if self.is_composite(interval) {
            self.composite(self.configuration.fc_ksi).yb_in
        } else {
            self.section.yb_in
        };
        let count = self.configuration.group(strand_type).count as f64;
        Ok((yb - cg, count))
    }

    fn strand_count(&self, segment: &SegmentKey, strand_type: StrandType) -> LossResult<usize> {
        self.segment_length(segment)?;
        Ok(self.configuration.group(strand_type).count)
    }
}

impl ForceProvider for GirderModel {
    /// Effective force at the end of `interval`, net of elastic shortening
    /// and the time-dependent losses developed so far
    fn pretension_force(
        &self,
        poi: &PointOfInterest,
        strand_type: StrandType,
        interval: IntervalIndex,
        _time: IntervalTime,
    ) -> LossResult<f64> {
        let group = self.configuration.group(strand_type);
        if group.count == 0 || interval < self.release_interval(&poi.segment())? {
            return Ok(0.0);
        }
        if strand_type == StrandType::Temporary
            && self
                .temporary_strand_removal_interval
                .is_some_and(|removal| interval >= removal)
        {
            return Ok(0.0);
        }
        let mut strategy = LossStrategy::new(self.beam_type, self.criteria.clone())?;
        let series = strategy.compute_series(self, poi, &self.configuration, interval)?;
        let losses = series.last().map(|d| d.pretension_losses()).unwrap_or(0.0);
        let aps = self.strand.total_area_in2(group.count);
        let fpj = group.jacking_stress_ksi(self.strand.area_in2);
        Ok(aps * (fpj - losses).max(0.0))
    }
}

impl LossInputProvider for GirderModel {
    fn loss_criteria(&self) -> LossCriteria {
        self.criteria.clone()
    }

    fn girder_configuration(&self, segment: &SegmentKey) -> LossResult<GirderConfiguration> {
        self.segment_length(segment)?;
        Ok(self.configuration.clone())
    }

    fn strand_material(&self, segment: &SegmentKey) -> LossResult<StrandMaterial> {
        self.segment_length(segment)?;
        Ok(self.strand)
    }

    fn loss_inputs(
        &self,
        poi: &PointOfInterest,
        config: &GirderConfiguration,
    ) -> LossResult<LossInputs> {
        let length = self.segment_length(&poi.segment())?;
        let x = poi.dist_from_start_ft();
        if !(0.0..=length).contains(&x) {
            return Err(LossError::location_not_found(
                poi.to_string(),
                format!("segment is {:.2} ft long", length),
            ));
        }

        let g = &self.section;
        let c = self.composite(config.fc_ksi);
        let strand = &self.strand;
        let area = |count: usize| strand.total_area_in2(count);
        let cg = |t: StrandType| self.strand_cg_in(t, x, length);

        let aps_straight = area(config.straight.count);
        let aps_harped = area(config.harped.count);
        let aps_permanent = aps_straight + aps_harped;
        let aps_temporary = area(config.temporary.count);
        let permanent_cg = if aps_permanent > 0.0 {
            (aps_straight * cg(StrandType::Straight) + aps_harped * cg(StrandType::Harped)) / aps_permanent
        } else {
            cg(StrandType::Straight)
        };
        let fpj_permanent = if aps_permanent > 0.0 {
            (config.straight.jacking_force_kip + config.harped.jacking_force_kip) / aps_permanent
        } else {
            0.0
        };

        let girder_weight = g.area_in2 / 144.0 * g.unit_weight_kcf;
        let deck_weight =
            self.deck.thickness_in * self.deck.effective_width_in / 144.0 * self.deck.unit_weight_kcf;

        Ok(LossInputs {
            strand: *strand,
            aps_permanent_in2: aps_permanent,
            aps_temporary_in2: aps_temporary,
            fpj_permanent_ksi: fpj_permanent,
            fpj_temporary_ksi: config.temporary.jacking_stress_ksi(strand.area_in2),
            temporary_usage: config.temporary_usage,
            e_permanent_in: g.yb_in - permanent_cg,
            e_temporary_in: g.yb_in - cg(StrandType::Temporary),
            e_permanent_composite_in: c.yb_in - permanent_cg,
            ag_in2: g.area_in2,
            ig_in4: g.inertia_in4,
            ac_in2: c.area_in2,
            ic_in4: c.inertia_in4,
            girder_moment_kip_in: Self::moment_kip_in(girder_weight, x, length),
            noncomposite_dead_moment_kip_in: Self::moment_kip_in(deck_weight, x, length),
            composite_dead_moment_kip_in: Self::moment_kip_in(self.deck.superimposed_kip_per_ft, x, length),
            vs_ratio_in: g.vs_ratio_in,
            relative_humidity_pct: self.relative_humidity_pct,
            fci_ksi: config.fci_ksi,
            fc_ksi: config.fc_ksi,
            eci_ksi: concrete_modulus_ksi(config.fci_ksi),
            ec_ksi: concrete_modulus_ksi(config.fc_ksi),
            deck: Some(DeckInputs {
                area_in2: c.deck_area_in2,
                eccentricity_in: c.deck_eccentricity_in,
                fc_ksi: self.deck.fc_ksi,
                ec_ksi: concrete_modulus_ksi(self.deck.fc_ksi),
                vs_ratio_in: self.deck.thickness_in / 2.0,
            }),
        })
    }
}

impl TendonProvider for GirderModel {
    fn duct_count(&self, scope: &TendonScope) -> usize {
        match scope {
            TendonScope::Girder(key) if *key == self.girder => self.girder_tendons.len(),
            TendonScope::Segment(key) if key.girder_key() == self.girder => self
                .segment_tendons
                .iter()
                .filter(|t| t.segment == key.segment)
                .count(),
            _ => 0,
        }
    }

    fn duct(&self, scope: &TendonScope, duct: usize) -> LossResult<DuctData> {
        let (tendon, _) = self.tendon(scope, duct)?;
        Ok(DuctData {
            strand_count: tendon.strand_count,
            strand: self.tendon_strand,
            jacking_force_kip: tendon.jacking_force_kip,
            jacking_end: tendon.jacking_end,
        })
    }

    fn tendon_stations(&self, scope: &TendonScope, duct: usize) -> LossResult<Vec<TendonStation>> {
        let (tendon, length) = self.tendon(scope, duct)?;
        Ok(tendon.stations(length))
    }

    fn tendon_coordinate(
        &self,
        scope: &TendonScope,
        duct: usize,
        poi: &PointOfInterest,
    ) -> LossResult<Option<f64>> {
        self.tendon(scope, duct)?;
        let segment = poi.segment();
        if segment.girder_key() != self.girder {
            return Ok(None);
        }
        Ok(match scope {
            TendonScope::Girder(_) => {
                let offset: f64 = self.segment_lengths_ft.iter().take(segment.segment).sum();
                Some(offset + poi.dist_from_start_ft())
            }
            TendonScope::Segment(key) if *key == segment => Some(poi.dist_from_start_ft()),
            TendonScope::Segment(_) => None,
        })
    }
}
