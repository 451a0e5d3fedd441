//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect};

use crate::pipeline::filter::format_number;
use crate::pipeline::{FilterCriteria, FilterField, FilterKind, FilterOptions};

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Ask for filter criteria field by field.
///
/// Categorical fields are multi-selects pre-checked from `current`, which
/// also lists any current value the dataset options lack; leaving a field
/// with nothing checked keeps every house. Size fields take an optional
/// whole-number upper bound.
pub fn select_filters(options: &FilterOptions, current: &FilterCriteria) -> Result<FilterCriteria> {
    let theme = ColorfulTheme::default();
    let mut criteria = FilterCriteria::new();

    for field in FilterField::ALL {
        match field.kind() {
            FilterKind::Membership => {
                let choices = options.choices(field, current);
                if choices.is_empty() {
                    continue;
                }
                let defaults: Vec<bool> = choices.iter().map(|(_, on)| *on).collect();
                let items: Vec<String> = choices.iter().map(|(v, _)| format_number(*v)).collect();

                let picks = MultiSelect::with_theme(&theme)
                    .with_prompt(format!(
                        "{} (space to toggle, enter to confirm, none = all)",
                        field.label()
                    ))
                    .items(&items)
                    .defaults(&defaults)
                    .interact()?;

                criteria.allow(field, picks.into_iter().map(|i| choices[i].0).collect())?;
            }
            FilterKind::UpperBound => {
                let Some(range) = options.range(field) else {
                    continue;
                };
                let initial = current
                    .bound(field)
                    .map(|b| format!("{}", b as i64))
                    .unwrap_or_default();

                let answer: String = Input::with_theme(&theme)
                    .with_prompt(format!(
                        "{} below ({} - {}, blank = no limit)",
                        field.label(),
                        range.min,
                        range.max
                    ))
                    .with_initial_text(initial)
                    .allow_empty(true)
                    .validate_with(|text: &String| -> Result<(), String> {
                        let text = text.trim();
                        if text.is_empty() || text.parse::<i64>().is_ok() {
                            Ok(())
                        } else {
                            Err("enter a whole number or leave blank".to_string())
                        }
                    })
                    .interact_text()?;

                if let Ok(bound) = answer.trim().parse::<i64>() {
                    criteria.upper_bound(field, bound as f64)?;
                }
            }
        }
    }

    Ok(criteria)
}
