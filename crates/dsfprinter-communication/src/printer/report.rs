//! Status report lines built from the machine model

use super::DsfPrinter;
use dsfprinter_settings::render_template;
use std::collections::HashMap;
use std::fmt::Write;

fn push_heater(report: &mut String, label: &str, current: f64, target: f64) {
    if !report.is_empty() {
        report.push(' ');
    }
    // Writing to a String cannot fail.
    let _ = write!(report, "{}:{:.2} /{:.2}", label, current, target);
}

impl DsfPrinter {
    /// Temperature report in the `M105` response format.
    ///
    /// One tool is reported as `T:`, several as `T0:`, `T1:`... followed by
    /// the bed (`B:`) and chamber (`C:`). A bed or chamber the settings
    /// declare but the model lacks reports the ambient temperature.
    pub fn temperature_report(&self) -> String {
        let settings = self.settings();
        let ambient = settings.ambient_temperature;
        let mut report = String::new();

        let tools = self.tool_temps();
        match tools.as_slice() {
            [] => {}
            [(_, current, target)] => push_heater(&mut report, "T", *current, *target),
            _ => {
                for (tool, current, target) in &tools {
                    push_heater(&mut report, &format!("T{}", tool), *current, *target);
                }
            }
        }

        if self.has_bed_heater() {
            push_heater(&mut report, "B", self.current_bed_temp(), self.target_bed_temp());
        } else if settings.has_bed {
            push_heater(&mut report, "B", ambient, 0.0);
        }

        if self.has_chamber_heater() {
            push_heater(
                &mut report,
                "C",
                self.current_chamber_temp(),
                self.target_chamber_temp(),
            );
        } else if settings.has_chamber {
            push_heater(&mut report, "C", ambient, 0.0);
        }

        tracing::debug!("temperature report: {}", report);
        report
    }

    /// Firmware report in the `M115` response format
    pub fn firmware_report(&self) -> String {
        let settings = self.settings();
        let mut values = HashMap::new();
        values.insert("firmware_name", settings.firmware_name.clone());
        render_template(&settings.m115_format_string, &values)
    }
}

#[cfg(test)]
mod tests {
    use super::push_heater;

    #[test]
    fn test_push_heater_separates_entries() {
        let mut report = String::new();
        push_heater(&mut report, "T", 200.0, 210.5);
        push_heater(&mut report, "B", 60.0, 0.0);
        assert_eq!(report, "T:200.00 /210.50 B:60.00 /0.00");
    }
}
