//! CSV export of the rows a table currently shows

use std::io::Write;

use grid_core::TableFrame;
use tracing::debug;

use crate::DataError;

/// Write the frame's header labels and rendered rows as CSV.
///
/// Only loaded rows are written; skeleton, empty and unavailable bodies
/// produce a header line alone. Returns the number of data rows written.
pub fn export_frame_csv<W: Write>(frame: &TableFrame, writer: W) -> Result<usize, DataError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(frame.header.iter().map(|cell| cell.label.as_str()))?;

    let rows = frame.rows();
    for row in rows {
        csv_writer.write_record(&row.cells)?;
    }
    csv_writer.flush()?;

    debug!(title = ?frame.title, rows = rows.len(), "Exported table frame");
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_core::{Body, HeaderCell, RenderedRow};

    fn header(id: &str, label: &str) -> HeaderCell {
        HeaderCell {
            id: id.into(),
            label: label.into(),
            sortable: true,
            numeric: false,
            sort: None,
        }
    }

    fn frame(body: Body) -> TableFrame {
        TableFrame {
            title: Some("Households".into()),
            header: vec![header("unicefId", "ID"), header("headOfHousehold", "Head, of household")],
            body,
            loading: false,
            error: None,
            pagination: None,
            selection: None,
        }
    }

    #[test]
    fn test_export_loaded_rows() {
        let body = Body::Rows(vec![
            RenderedRow {
                id: "1".into(),
                cells: vec!["HH-001".into(), "Amina \"Ami\" Yusuf".into()],
                selected: false,
            },
            RenderedRow {
                id: "2".into(),
                cells: vec!["HH-002".into(), "Bilal Karimi".into()],
                selected: true,
            },
        ]);

        let mut out = Vec::new();
        let written = export_frame_csv(&frame(body), &mut out).unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ID,\"Head, of household\"\nHH-001,\"Amina \"\"Ami\"\" Yusuf\"\nHH-002,Bilal Karimi\n"
        );
    }

    #[test]
    fn test_skeleton_exports_header_only() {
        let mut out = Vec::new();
        let written = export_frame_csv(&frame(Body::Skeleton { rows: 10 }), &mut out).unwrap();
        assert_eq!(written, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "ID,\"Head, of household\"\n");
    }
}
