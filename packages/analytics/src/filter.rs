//! Selection of the incidents that satisfy a [`FilterSelection`].

use fire_dispatch_incident_models::{ClassifiedIncident, FilterSelection};

/// Returns the incidents that pass `selection`, in dataset order.
///
/// Empty sets in the selection are wildcards, so an unconstrained selection
/// returns every incident.
#[must_use]
pub fn filter_incidents<'a>(
    dataset: &'a [ClassifiedIncident],
    selection: &FilterSelection,
) -> Vec<&'a ClassifiedIncident> {
    if selection.is_unconstrained() {
        return dataset.iter().collect();
    }

    let filtered: Vec<_> = dataset.iter().filter(|i| selection.matches(i)).collect();
    log::debug!(
        "Filter kept {} of {} incidents",
        filtered.len(),
        dataset.len()
    );
    filtered
}
