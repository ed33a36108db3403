//! Rendering of a selection round.

use comfy_table::Table;

use crate::student::Student;

/// Double lined outer borders with single lined separators inside.
const ROSTER_PRESET: &str = "║║══╟─┼╢│─┼╟╢╤╧╔╗╚╝";

/// Renders the students as a two column `Name | Count` table, keeping their order.
pub fn render(students: &[Student]) -> String {
    let mut table = Table::new();
    table.load_preset(ROSTER_PRESET);
    table.set_header(vec!["Name", "Count"]);
    for student in students {
        table.add_row(vec![student.name.clone(), student.count.to_string()]);
    }
    table.to_string()
}
