/// Text panels: the coloured mesh info block and the format comparison table
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use meshlens_core::{MeshFormat, MeshReport, TopologyStats};
use std::io::Write;

/// Colours of the three counts, matching points / wireframe / faces views
const VERTEX_COLOR: Color = Color::Blue;
const EDGE_COLOR: Color = Color::Green;
const FACE_COLOR: Color = Color::Red;

/// Format a count with thousands separators (`12345` -> `12,345`)
pub fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Draw the info panel for one mesh
pub fn draw_info_panel<W: Write>(
    writer: &mut W,
    title: &str,
    format: MeshFormat,
    stats: &TopologyStats,
    indexed: bool,
) -> std::io::Result<()> {
    queue!(
        writer,
        SetForegroundColor(Color::Yellow),
        Print(format!("Mesh Info | {title}\n")),
        ResetColor,
        Print(format!("  {:<10}{}\n", "Format:", format)),
    )?;

    for (label, value, color) in [
        ("Vertices:", stats.vertices, VERTEX_COLOR),
        ("Edges:", stats.edges, EDGE_COLOR),
        ("Faces:", stats.faces, FACE_COLOR),
    ] {
        queue!(
            writer,
            Print(format!("  {label:<10}")),
            SetForegroundColor(color),
            Print(group_thousands(value)),
            ResetColor,
            Print("\n"),
        )?;
    }

    if !indexed {
        queue!(
            writer,
            SetForegroundColor(Color::DarkGrey),
            Print("  (non-indexed geometry: edge count is estimated, use --weld for an exact count)\n"),
            ResetColor,
        )?;
    }

    writer.flush()
}

/// Render the side-by-side comparison of the same model in each format
pub fn comparison_table(reports: &[MeshReport]) -> String {
    let rule_heavy = "=".repeat(80);
    let rule_light = "-".repeat(80);
    let mut out = format!("{rule_heavy}\nCOMPARISON TABLE\n{rule_heavy}\n");

    out.push_str(&format!("{:<25}", "Property"));
    for format in MeshFormat::ALL {
        out.push_str(&format!(" {:>15}", format.name()));
    }
    out.push('\n');
    out.push_str(&rule_light);
    out.push('\n');

    let rows: [(&str, fn(&MeshReport) -> String); 6] = [
        ("Vertices", |r| r.vertices.to_string()),
        ("Faces", |r| r.faces.to_string()),
        ("Edges", |r| r.edges.to_string()),
        ("Volume", |r| format!("{:.2}", r.volume)),
        ("Surface Area", |r| format!("{:.2}", r.surface_area)),
        ("Duplicate Vertices", |r| r.duplicate_vertices.to_string()),
    ];

    for (name, cell) in rows {
        out.push_str(&format!("{name:<25}"));
        for format in MeshFormat::ALL {
            let value = reports
                .iter()
                .find(|r| r.format == format)
                .map(cell)
                .unwrap_or_else(|| "N/A".to_string());
            out.push_str(&format!(" {value:>15}"));
        }
        out.push('\n');
    }

    out.push_str(&rule_heavy);
    out.push('\n');
    out
}
