use indexmap::IndexMap;
use log::warn;

/// Merges custom labels over the generated ones,
/// warning when a custom label replaces a different value.
#[must_use]
pub fn aggregate_labels(
    mut generated: IndexMap<String, String>,
    custom_labels: &[(String, String)],
) -> IndexMap<String, String> {
    for (key, value) in custom_labels {
        if let Some(previous) = generated.insert(key.clone(), value.clone()) {
            if previous != *value {
                warn!(
                    "Found conflicting values for label {key}, custom value: {value}, generated value: {previous}"
                );
            }
        }
    }

    generated
}
