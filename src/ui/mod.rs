pub mod panels;
pub mod plot;
pub mod tables;

use eframe::egui::{Color32, RichText, Ui};

/// Compact tonnage label: `1.23 Gt`, `45.6 Mt`, `7.8 kt`, `12 t`.
pub fn format_tonnes(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.2} Gt", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1} Mt", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1} kt", value / 1e3)
    } else {
        format!("{value:.0} t")
    }
}

/// Placeholder shown instead of a chart that has nothing to draw.
pub fn no_data(ui: &mut Ui, message: &str) {
    ui.add_space(12.0);
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(message).italics().color(Color32::GRAY));
    });
    ui.add_space(12.0);
}

#[cfg(test)]
mod tests {
    use super::format_tonnes;

    #[test]
    fn tonnes_pick_a_unit() {
        assert_eq!(format_tonnes(11_902_503_000.0), "11.90 Gt");
        assert_eq!(format_tonnes(45_600_000.0), "45.6 Mt");
        assert_eq!(format_tonnes(7_800.0), "7.8 kt");
        assert_eq!(format_tonnes(12.0), "12 t");
    }
}
