//! Minimum-refuel-stop covering over plain projected positions.

use thiserror::Error;

/// No sequence of refuelling stops covers the route.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error(
    "cannot refuel beyond {reached} of {route_length} with a range of {range}; next candidate at {next_candidate:?}"
)]
pub struct InfeasibleFuelPlan {
    /// Furthest position reached with a full tank.
    pub reached: f64,
    /// Effective range of the truck.
    pub range: f64,
    /// Length of the route being covered.
    pub route_length: f64,
    /// Position of the first candidate beyond reach, if any.
    pub next_candidate: Option<f64>,
}

/// Choose the fewest refuelling stops that carry the truck to the end.
///
/// `positions` are projected positions along the route, `route_length` is the
/// position of the destination and `range` the distance covered on a full
/// tank. The truck starts at position zero with a full tank. At every hop the
/// farthest candidate strictly ahead and within range is chosen; among equal
/// positions the earliest index wins. Returns the chosen indices in route
/// order.
///
/// # Errors
///
/// Returns [`InfeasibleFuelPlan`] when no candidate is reachable before the
/// destination is in range.
///
/// # Examples
/// ```
/// use haulroute_core::stops::select_refuel_stops;
///
/// let chosen = select_refuel_stops(&[0.0, 150.0, 310.0, 480.0], 500.0, 200.0)?;
/// assert_eq!(chosen, [1, 2]);
///
/// assert!(select_refuel_stops(&[0.0, 450.0], 500.0, 200.0).is_err());
/// # Ok::<(), haulroute_core::stops::InfeasibleFuelPlan>(())
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "reach is the current position plus the range"
)]
pub fn select_refuel_stops(
    positions: &[f64],
    route_length: f64,
    range: f64,
) -> Result<Vec<usize>, InfeasibleFuelPlan> {
    let reach_per_tank = if range.is_nan() { 0.0 } else { range.max(0.0) };
    let mut ordered: Vec<(f64, usize)> = positions
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, position)| position.is_finite())
        .map(|(index, position)| (position, index))
        .collect();
    ordered.sort_by(|lhs, rhs| lhs.0.total_cmp(&rhs.0).then(lhs.1.cmp(&rhs.1)));

    let mut chosen = Vec::new();
    let mut current = 0.0;
    let mut cursor = 0;
    while current + reach_per_tank < route_length {
        let reach = current + reach_per_tank;
        let mut best: Option<(f64, usize)> = None;
        while let Some(&(position, index)) = ordered.get(cursor) {
            if position > reach {
                break;
            }
            if position > current && best.is_none_or(|(farthest, _)| position > farthest) {
                best = Some((position, index));
            }
            cursor += 1;
        }
        let Some((position, index)) = best else {
            return Err(InfeasibleFuelPlan {
                reached: current,
                range: reach_per_tank,
                route_length,
                next_candidate: ordered.get(cursor).map(|&(next, _)| next),
            });
        };
        chosen.push(index);
        current = position;
    }
    Ok(chosen)
}
