//! Spatial hit-testing (§4.3 Binding Index, component C3).
//!
//! Rebuilt only when the layout preset, column settings, or custom-button
//! set changes — never per frame — so the per-contact hot path is a handful
//! of geometry comparisons against an already-built index.

use core_events::Side;

use crate::keymap::CustomButton;
use crate::layout::{KeyLayout, LayoutKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingHit {
    Custom(String),
    Grid { row: u8, col: u8 },
}

pub struct BindingIndex {
    left_keys: Vec<LayoutKey>,
    right_keys: Vec<LayoutKey>,
}

impl BindingIndex {
    pub fn new(left: &KeyLayout, right: &KeyLayout) -> Self {
        Self {
            left_keys: left.keys.clone(),
            right_keys: right.keys.clone(),
        }
    }

    fn keys_for(&self, side: Side) -> &[LayoutKey] {
        match side {
            Side::Left => &self.left_keys,
            Side::Right => &self.right_keys,
        }
    }

    /// Resolve a normalized point to a binding per §4.3:
    /// 1. custom buttons in insertion order (first containing match wins),
    /// 2. static grid containment (ties broken by largest enclosing area),
    /// 3. among keys whose center is within the snap radius, the one with
    ///    the largest (closest-to-boundary) `signed_edge_distance`,
    /// 4. deterministic tie-break by distance to center, then row, then column.
    pub fn hit(
        &self,
        side: Side,
        custom_buttons: &[CustomButton],
        snap_radius: f32,
        x: f32,
        y: f32,
    ) -> Option<BindingHit> {
        for button in custom_buttons {
            if button.side == side && button.rect.geometry().contains(x, y) {
                return Some(BindingHit::Custom(button.id.clone()));
            }
        }

        let keys = self.keys_for(side);

        let mut largest: Option<(&LayoutKey, f32)> = None;
        for key in keys {
            let geo = key.rect.geometry();
            if !geo.contains(x, y) {
                continue;
            }
            match largest {
                Some((_, area)) if geo.area <= area => {}
                _ => largest = Some((key, geo.area)),
            }
        }
        if let Some((key, _)) = largest {
            return Some(BindingHit::Grid {
                row: key.row,
                col: key.col,
            });
        }

        let mut nearest: Option<(&LayoutKey, f32, f32)> = None;
        for key in keys {
            let geo = key.rect.geometry();
            let center_dist = geo.distance_to_center(x, y);
            if center_dist > snap_radius {
                continue;
            }
            let edge_dist = geo.signed_edge_distance(x, y);
            let better = match nearest {
                None => true,
                Some((best_key, best_edge, best_center)) => {
                    edge_dist > best_edge
                        || (edge_dist == best_edge
                            && (center_dist < best_center
                                || (center_dist == best_center
                                    && (key.row, key.col) < (best_key.row, best_key.col))))
                }
            };
            if better {
                nearest = Some((key, edge_dist, center_dist));
            }
        }
        nearest.map(|(key, _, _)| BindingHit::Grid {
            row: key.row,
            col: key.col,
        })
    }
}
