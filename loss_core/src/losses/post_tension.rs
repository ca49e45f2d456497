//! # Post-Tensioning Losses
//!
//! Friction and anchor set in the tendons of a spliced girder, evaluated
//! once per duct and then sampled at any distance along the tendon.
//!
//! ```text
//! friction    ΔfpF(x) = fpj·(1 - e^-(μα + Kx))        x from the stressing end
//! slope       p       = Aps·(ΔfpF2 - ΔfpF1)/(x2 - x1)  two stations nearest the end
//! seating     Lset    = √(Dset·Aps·Ep / p)
//! at anchor   ΔfpAT   = 2·p·Lset / Aps
//! anchor set  ΔfpA(X) = ΔfpAT·(Lset - X)/Lset          X < Lset
//! ```
//!
//! Tendons jacked from both ends take friction and anchor set from the
//! nearer end.

use serde::{Deserialize, Serialize};

use crate::criteria::PostTensionParameters;
use crate::errors::{LossError, LossResult};
use crate::intervals::IntervalIndex;
use crate::providers::{DuctData, JackingEnd, TendonEnd, TendonProvider, TendonScope, TendonStation};

/// Seating parameters at one end of a duct
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AnchorSetEnd {
    /// Friction loss gradient near the anchor (kip/in)
    pub friction_slope_kip_per_in: f64,
    /// Length over which seating reduces the strand stress (ft)
    pub seating_length_ft: f64,
    /// Anchor set loss at the anchorage
    pub loss_at_anchor_ksi: f64,
}

/// Anchor set parameters of one duct
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorSetDetails {
    pub scope: TendonScope,
    pub duct: usize,
    pub jacking_end: JackingEnd,
    pub left: AnchorSetEnd,
    pub right: AnchorSetEnd,
}

impl AnchorSetDetails {
    pub fn at(&self, end: TendonEnd) -> &AnchorSetEnd {
        match end {
            TendonEnd::Left => &self.left,
            TendonEnd::Right => &self.right,
        }
    }
}

/// Trapezoidal averages of the post-tensioning losses over a tendon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageTendonLoss {
    pub friction_ksi: f64,
    pub anchor_set_ksi: f64,
}

impl AverageTendonLoss {
    pub fn total_ksi(&self) -> f64 {
        self.friction_ksi + self.anchor_set_ksi
    }
}

/// Friction and anchor set model of one duct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuctLosses {
    pub duct: usize,
    pub data: DuctData,
    pub length_ft: f64,
    pub stations: Vec<TendonStation>,
    pub anchor_set: AnchorSetDetails,
    pub average: AverageTendonLoss,
    pub elongation_left_in: f64,
    pub elongation_right_in: f64,
    params: PostTensionParameters,
}

impl DuctLosses {
    fn build(
        scope: TendonScope,
        duct: usize,
        data: DuctData,
        stations: Vec<TendonStation>,
        params: PostTensionParameters,
    ) -> LossResult<Self> {
        if stations.len() < 2 {
            return Err(LossError::calculation_failed(
                "Post-tensioning friction",
                format!("{} duct {} needs at least two profile stations", scope, duct + 1),
            ));
        }
        if stations.windows(2).any(|w| w[1].x_ft <= w[0].x_ft) {
            return Err(LossError::invalid_input(
                "tendon_stations",
                format!("{} duct {}", scope, duct + 1),
                "Stations must be strictly increasing",
            ));
        }
        let length_ft = stations[stations.len() - 1].x_ft - stations[0].x_ft;

        let placeholder = AnchorSetDetails {
            scope,
            duct,
            jacking_end: data.jacking_end,
            left: AnchorSetEnd::default(),
            right: AnchorSetEnd::default(),
        };
        let mut losses = DuctLosses {
            duct,
            data,
            length_ft,
            stations,
            anchor_set: placeholder,
            average: AverageTendonLoss {
                friction_ksi: 0.0,
                anchor_set_ksi: 0.0,
            },
            elongation_left_in: 0.0,
            elongation_right_in: 0.0,
            params,
        };

        losses.anchor_set.left = losses.seating(TendonEnd::Left);
        losses.anchor_set.right = losses.seating(TendonEnd::Right);

        let (x0, xn) = (losses.start_ft(), losses.start_ft() + length_ft);
        losses.average = AverageTendonLoss {
            friction_ksi: losses.average_over(x0, xn, |x| losses.friction_at(x)),
            anchor_set_ksi: losses.average_over(x0, xn, |x| losses.anchor_set_at(x)),
        };

        let fpj = data.fpj_ksi();
        let ep = data.strand.ep_ksi;
        let mid = x0 + length_ft / 2.0;
        match data.jacking_end {
            JackingEnd::Left => {
                losses.elongation_left_in = (fpj - losses.average.friction_ksi) * length_ft * 12.0 / ep;
            }
            JackingEnd::Right => {
                losses.elongation_right_in = (fpj - losses.average.friction_ksi) * length_ft * 12.0 / ep;
            }
            JackingEnd::Both => {
                let half = length_ft / 2.0;
                let left = losses.average_over(x0, mid, |x| losses.friction_at(x));
                let right = losses.average_over(mid, xn, |x| losses.friction_at(x));
                losses.elongation_left_in = (fpj - left) * half * 12.0 / ep;
                losses.elongation_right_in = (fpj - right) * half * 12.0 / ep;
            }
        }
        Ok(losses)
    }

    fn start_ft(&self) -> f64 {
        self.stations[0].x_ft
    }

    fn total_angle(&self) -> f64 {
        self.stations[self.stations.len() - 1].alpha_rad
    }

    /// Angular change from the left end, interpolated between stations
    fn alpha_at(&self, x_ft: f64) -> f64 {
        let first = self.stations[0];
        if x_ft <= first.x_ft {
            return first.alpha_rad;
        }
        for w in self.stations.windows(2) {
            if x_ft <= w[1].x_ft {
                let t = (x_ft - w[0].x_ft) / (w[1].x_ft - w[0].x_ft);
                return w[0].alpha_rad + t * (w[1].alpha_rad - w[0].alpha_rad);
            }
        }
        self.total_angle()
    }

    fn friction_from(&self, end: TendonEnd, x_ft: f64) -> f64 {
        let (alpha, dist) = match end {
            TendonEnd::Left => (self.alpha_at(x_ft), x_ft - self.start_ft()),
            TendonEnd::Right => (
                self.total_angle() - self.alpha_at(x_ft),
                self.start_ft() + self.length_ft - x_ft,
            ),
        };
        let exponent = self.params.friction_coefficient * alpha + self.params.wobble_per_ft * dist;
        self.data.fpj_ksi() * (1.0 - (-exponent).exp())
    }

    /// End whose stressing governs the strand stress at `x_ft`
    fn governing_end(&self, x_ft: f64) -> TendonEnd {
        match self.data.jacking_end {
            JackingEnd::Left => TendonEnd::Left,
            JackingEnd::Right => TendonEnd::Right,
            JackingEnd::Both => {
                if x_ft - self.start_ft() <= self.length_ft / 2.0 {
                    TendonEnd::Left
                } else {
                    TendonEnd::Right
                }
            }
        }
    }

    /// Friction loss at a distance along the tendon
    pub fn friction_at(&self, x_ft: f64) -> f64 {
        self.friction_from(self.governing_end(x_ft), x_ft)
    }

    /// Anchor set loss at a distance along the tendon
    pub fn anchor_set_at(&self, x_ft: f64) -> f64 {
        let end = self.governing_end(x_ft);
        let seating = self.anchor_set.at(end);
        if seating.seating_length_ft <= 0.0 {
            return 0.0;
        }
        let from_anchor = match end {
            TendonEnd::Left => x_ft - self.start_ft(),
            TendonEnd::Right => self.start_ft() + self.length_ft - x_ft,
        };
        if from_anchor >= seating.seating_length_ft {
            0.0
        } else {
            seating.loss_at_anchor_ksi * (seating.seating_length_ft - from_anchor) / seating.seating_length_ft
        }
    }

    fn seating(&self, end: TendonEnd) -> AnchorSetEnd {
        let jacked = match end {
            TendonEnd::Left => self.data.jacking_end.jacks_left(),
            TendonEnd::Right => self.data.jacking_end.jacks_right(),
        };
        let aps = self.data.aps_in2();
        if !jacked || aps <= 0.0 {
            return AnchorSetEnd::default();
        }
        let n = self.stations.len();
        let (near, far) = match end {
            TendonEnd::Left => (self.stations[0].x_ft, self.stations[1].x_ft),
            TendonEnd::Right => (self.stations[n - 1].x_ft, self.stations[n - 2].x_ft),
        };
        let dx_in = (far - near).abs() * 12.0;
        let p = aps * (self.friction_from(end, far) - self.friction_from(end, near)) / dx_in;
        if p <= 0.0 {
            return AnchorSetEnd {
                friction_slope_kip_per_in: p,
                ..Default::default()
            };
        }
        let lset_in = (self.params.anchor_set_in * aps * self.data.strand.ep_ksi / p).sqrt();
        AnchorSetEnd {
            friction_slope_kip_per_in: p,
            seating_length_ft: lset_in / 12.0,
            loss_at_anchor_ksi: 2.0 * p * lset_in / aps,
        }
    }

    /// Trapezoidal average of `f` between two distances, sampled at the
    /// profile stations in between
    fn average_over(&self, from: f64, to: f64, f: impl Fn(f64) -> f64) -> f64 {
        if to <= from {
            return 0.0;
        }
        let mut xs = vec![from];
        xs.extend(self.stations.iter().map(|s| s.x_ft).filter(|x| *x > from && *x < to));
        xs.push(to);
        let area: f64 = xs
            .windows(2)
            .map(|w| 0.5 * (f(w[0]) + f(w[1])) * (w[1] - w[0]))
            .sum();
        area / (to - from)
    }

    /// Elongation at a jacking end (in), zero at a dead end
    pub fn elongation_in(&self, end: TendonEnd) -> f64 {
        match end {
            TendonEnd::Left => self.elongation_left_in,
            TendonEnd::Right => self.elongation_right_in,
        }
    }
}

/// Post-tensioning model of every duct in one scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TendonLosses {
    pub scope: TendonScope,
    pub stressing_interval: IntervalIndex,
    pub ducts: Vec<DuctLosses>,
}

impl TendonLosses {
    pub fn compute<B: TendonProvider + ?Sized>(
        broker: &B,
        scope: TendonScope,
        stressing_interval: IntervalIndex,
        params: PostTensionParameters,
    ) -> LossResult<Self> {
        let ducts = (0..broker.duct_count(&scope))
            .map(|duct| {
                let data = broker.duct(&scope, duct)?;
                let stations = broker.tendon_stations(&scope, duct)?;
                DuctLosses::build(scope, duct, data, stations, params)
            })
            .collect::<LossResult<Vec<_>>>()?;
        Ok(TendonLosses {
            scope,
            stressing_interval,
            ducts,
        })
    }

    pub fn duct(&self, duct: usize) -> LossResult<&DuctLosses> {
        self.ducts.get(duct).ok_or_else(|| {
            LossError::location_not_found(
                format!("{} duct {}", self.scope, duct + 1),
                format!("scope has {} ducts", self.ducts.len()),
            )
        })
    }
}

/// Post-tensioning losses of one duct at a POI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuctLossAtPoi {
    pub scope: TendonScope,
    pub duct: usize,
    pub aps_in2: f64,
    pub friction_ksi: f64,
    pub anchor_set_ksi: f64,
}

/// Post-tensioning losses of all ducts passing a POI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PostTensionLosses {
    pub ducts: Vec<DuctLossAtPoi>,
}

impl PostTensionLosses {
    fn weighted(&self, f: impl Fn(&DuctLossAtPoi) -> f64) -> f64 {
        let aps: f64 = self.ducts.iter().map(|d| d.aps_in2).sum();
        if aps <= 0.0 {
            return 0.0;
        }
        self.ducts.iter().map(|d| d.aps_in2 * f(d)).sum::<f64>() / aps
    }

    /// Area-weighted friction loss over the ducts
    pub fn friction_ksi(&self) -> f64 {
        self.weighted(|d| d.friction_ksi)
    }

    /// Area-weighted anchor set loss over the ducts
    pub fn anchor_set_ksi(&self) -> f64 {
        self.weighted(|d| d.anchor_set_ksi)
    }
}
