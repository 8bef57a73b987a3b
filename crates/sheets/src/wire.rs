//! Sheets v4 JSON encoding of [`SheetRequest`]s and decoding of responses.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use schedule::{
    CellFormat, Color, GridRange, HorizontalAlignment, SheetId, SheetProperties, SheetRequest,
    ValueRange, VerticalAlignment, WrapStrategy,
};

/// Encodes one request as an element of `batchUpdate.requests`.
pub fn request_json(request: &SheetRequest) -> Value {
    match request {
        SheetRequest::RenameSheet { sheet_id, title } => json!({
            "updateSheetProperties": {
                "properties": { "sheetId": sheet_id.as_u64(), "title": title },
                "fields": "title",
            }
        }),
        SheetRequest::FreezePanes {
            sheet_id,
            rows,
            columns,
        } => json!({
            "updateSheetProperties": {
                "properties": {
                    "sheetId": sheet_id.as_u64(),
                    "gridProperties": {
                        "frozenRowCount": rows,
                        "frozenColumnCount": columns,
                    },
                },
                "fields": "gridProperties.frozenRowCount,gridProperties.frozenColumnCount",
            }
        }),
        SheetRequest::FormatCells { range, format } => {
            let (format, fields) = cell_format(format);
            json!({
                "repeatCell": {
                    "range": grid_range(range),
                    "cell": { "userEnteredFormat": format },
                    "fields": format!("userEnteredFormat({})", fields.join(",")),
                }
            })
        }
        SheetRequest::ResizeRows {
            sheet_id,
            start,
            end,
            pixel_size,
        } => dimension(*sheet_id, "ROWS", *start, *end, *pixel_size),
        SheetRequest::ResizeColumns {
            sheet_id,
            start,
            end,
            pixel_size,
        } => dimension(*sheet_id, "COLUMNS", *start, *end, *pixel_size),
        SheetRequest::UnmergeCells { range } => json!({
            "unmergeCells": { "range": grid_range(range) }
        }),
        SheetRequest::MergeCells { range } => json!({
            "mergeCells": { "range": grid_range(range), "mergeType": "MERGE_ALL" }
        }),
        SheetRequest::SolidBorders { range, color } => {
            let border = json!({ "style": "SOLID", "color": color_json(color) });
            json!({
                "updateBorders": {
                    "range": grid_range(range),
                    "top": border,
                    "bottom": border,
                    "left": border,
                    "right": border,
                    "innerHorizontal": border,
                    "innerVertical": border,
                }
            })
        }
    }
}

/// Body of `spreadsheets.batchUpdate`.
pub fn batch_update_body(requests: &[SheetRequest]) -> Value {
    json!({ "requests": requests.iter().map(request_json).collect::<Vec<_>>() })
}

/// Body of `spreadsheets.values.update`.
pub fn value_range_json(values: &ValueRange) -> Value {
    json!({
        "range": values.range,
        "majorDimension": "ROWS",
        "values": values.values,
    })
}

/// Body of `spreadsheets.values.batchUpdate`.
pub fn batch_values_body(data: &[ValueRange]) -> Value {
    json!({
        "valueInputOption": "USER_ENTERED",
        "data": data.iter().map(value_range_json).collect::<Vec<_>>(),
    })
}

fn grid_range(range: &GridRange) -> Value {
    let mut obj = Map::new();
    obj.insert("sheetId".into(), json!(range.sheet_id.as_u64()));
    let bounds = [
        ("startRowIndex", range.start_row),
        ("endRowIndex", range.end_row),
        ("startColumnIndex", range.start_column),
        ("endColumnIndex", range.end_column),
    ];
    for (name, bound) in bounds {
        if let Some(v) = bound {
            obj.insert(name.into(), json!(v));
        }
    }
    Value::Object(obj)
}

fn dimension(sheet_id: SheetId, dimension: &str, start: u32, end: Option<u32>, px: u32) -> Value {
    let mut range = json!({
        "sheetId": sheet_id.as_u64(),
        "dimension": dimension,
        "startIndex": start,
    });
    if let Some(end) = end {
        range["endIndex"] = json!(end);
    }
    json!({
        "updateDimensionProperties": {
            "range": range,
            "properties": { "pixelSize": px },
            "fields": "pixelSize",
        }
    })
}

fn color_json(color: &Color) -> Value {
    json!({ "red": color.red, "green": color.green, "blue": color.blue })
}

/// The `userEnteredFormat` object and the names of the fields it sets.
fn cell_format(format: &CellFormat) -> (Value, Vec<&'static str>) {
    let mut obj = Map::new();
    let mut fields = Vec::new();
    if let Some(color) = &format.background {
        obj.insert("backgroundColor".into(), color_json(color));
        fields.push("backgroundColor");
    }
    if let Some(bold) = format.bold {
        obj.insert("textFormat".into(), json!({ "bold": bold }));
        fields.push("textFormat");
    }
    if let Some(h) = format.horizontal {
        let name = match h {
            HorizontalAlignment::Left => "LEFT",
            HorizontalAlignment::Center => "CENTER",
            HorizontalAlignment::Right => "RIGHT",
        };
        obj.insert("horizontalAlignment".into(), json!(name));
        fields.push("horizontalAlignment");
    }
    if let Some(v) = format.vertical {
        let name = match v {
            VerticalAlignment::Top => "TOP",
            VerticalAlignment::Middle => "MIDDLE",
            VerticalAlignment::Bottom => "BOTTOM",
        };
        obj.insert("verticalAlignment".into(), json!(name));
        fields.push("verticalAlignment");
    }
    if let Some(w) = format.wrap {
        let name = match w {
            WrapStrategy::OverflowCell => "OVERFLOW_CELL",
            WrapStrategy::Clip => "CLIP",
            WrapStrategy::Wrap => "WRAP",
        };
        obj.insert("wrapStrategy".into(), json!(name));
        fields.push("wrapStrategy");
    }
    (Value::Object(obj), fields)
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSheetProperties {
    // Zero is the default and is omitted by the service.
    #[serde(default)]
    sheet_id: u64,
    #[serde(default)]
    title: String,
}

impl From<WireSheetProperties> for SheetProperties {
    fn from(p: WireSheetProperties) -> Self {
        SheetProperties {
            sheet_id: SheetId::new(p.sheet_id),
            title: p.title,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireSheet {
    properties: WireSheetProperties,
}

#[derive(Debug, Deserialize)]
struct WireSpreadsheet {
    #[serde(default)]
    sheets: Vec<WireSheet>,
}

/// Tab list from a `spreadsheets.get` response.
pub fn parse_sheet_list(body: Value) -> Result<Vec<SheetProperties>, serde_json::Error> {
    let spreadsheet: WireSpreadsheet = serde_json::from_value(body)?;
    Ok(spreadsheet
        .sheets
        .into_iter()
        .map(|s| s.properties.into())
        .collect())
}

/// Properties from a `sheets.copyTo` response.
pub fn parse_sheet_properties(body: Value) -> Result<SheetProperties, serde_json::Error> {
    let props: WireSheetProperties = serde_json::from_value(body)?;
    Ok(props.into())
}

/// Id of the tab created by the first `addSheet` reply of a batch update.
pub fn parse_added_sheet(body: &Value) -> Option<SheetId> {
    body.pointer("/replies/0/addSheet/properties")
        .map(|p| p.get("sheetId").and_then(Value::as_u64).unwrap_or(0))
        .map(SheetId::new)
}

#[derive(Debug, Deserialize)]
struct WireValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Cell values from a `values.get` response, rendered as strings.
pub fn parse_values(body: Value) -> Result<Vec<Vec<String>>, serde_json::Error> {
    let range: WireValueRange = serde_json::from_value(body)?;
    Ok(range
        .values
        .into_iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_request_uses_merge_all() {
        let request = SheetRequest::MergeCells {
            range: GridRange::new(SheetId::new(9), (2, 5), (3, 4)),
        };
        assert_eq!(
            request_json(&request),
            json!({
                "mergeCells": {
                    "range": {
                        "sheetId": 9,
                        "startRowIndex": 2,
                        "endRowIndex": 5,
                        "startColumnIndex": 3,
                        "endColumnIndex": 4,
                    },
                    "mergeType": "MERGE_ALL",
                }
            })
        );
    }

    #[test]
    fn cell_format_field_mask_lists_set_fields() {
        let header = request_json(&SheetRequest::FormatCells {
            range: GridRange::new(SheetId::new(1), (0, 2), (0, 16)),
            format: CellFormat::header(),
        });
        assert_eq!(
            header["repeatCell"]["fields"],
            "userEnteredFormat(backgroundColor,textFormat)"
        );
        assert_eq!(
            header["repeatCell"]["cell"]["userEnteredFormat"]["textFormat"]["bold"],
            true
        );

        let centered = request_json(&SheetRequest::FormatCells {
            range: GridRange::new(SheetId::new(1), (0, 92), (0, 16)),
            format: CellFormat::centered_wrapped(),
        });
        assert_eq!(
            centered["repeatCell"]["fields"],
            "userEnteredFormat(horizontalAlignment,verticalAlignment,wrapStrategy)"
        );
        assert_eq!(
            centered["repeatCell"]["cell"]["userEnteredFormat"]["horizontalAlignment"],
            "CENTER"
        );
    }

    #[test]
    fn open_ended_ranges_omit_bounds() {
        let resize = request_json(&SheetRequest::ResizeRows {
            sheet_id: SheetId::new(3),
            start: 0,
            end: None,
            pixel_size: 30,
        });
        let range = &resize["updateDimensionProperties"]["range"];
        assert_eq!(range["dimension"], "ROWS");
        assert!(range.get("endIndex").is_none());

        let borders = request_json(&SheetRequest::SolidBorders {
            range: GridRange::rows_from(SheetId::new(3), 7, (0, 20)),
            color: Color::BLACK,
        });
        let range = &borders["updateBorders"]["range"];
        assert_eq!(range["startRowIndex"], 7);
        assert!(range.get("endRowIndex").is_none());
        assert_eq!(borders["updateBorders"]["innerVertical"]["style"], "SOLID");
    }

    #[test]
    fn sheet_list_defaults_missing_zero_id() {
        let body = json!({
            "sheets": [
                { "properties": { "title": "Template", "index": 0 } },
                { "properties": { "sheetId": 688800800, "title": "overview" } },
            ]
        });
        let sheets = parse_sheet_list(body).unwrap();
        assert_eq!(sheets[0].sheet_id, SheetId::new(0));
        assert_eq!(sheets[1].sheet_id, SheetId::new(688_800_800));
        assert_eq!(sheets[1].title, "overview");
    }

    #[test]
    fn values_are_rendered_as_text() {
        let body = json!({
            "range": "'STAGE 1 / Fans'!A1:T10",
            "majorDimension": "ROWS",
            "values": [["XJ8", 1, true], []],
        });
        assert_eq!(
            parse_values(body).unwrap(),
            vec![vec!["XJ8".to_string(), "1".into(), "true".into()], vec![]]
        );
        assert!(parse_values(json!({ "range": "x" })).unwrap().is_empty());
    }

    #[test]
    fn added_sheet_id_is_read_from_first_reply() {
        let body = json!({
            "replies": [{ "addSheet": { "properties": { "sheetId": 123, "title": "overview" } } }]
        });
        assert_eq!(parse_added_sheet(&body), Some(SheetId::new(123)));
        assert_eq!(parse_added_sheet(&json!({ "replies": [{}] })), None);
    }

    #[test]
    fn value_batches_are_user_entered() {
        let body = batch_values_body(&[ValueRange {
            range: "'overview'!A1".into(),
            values: vec![vec!["Time".into()]],
        }]);
        assert_eq!(body["valueInputOption"], "USER_ENTERED");
        assert_eq!(body["data"][0]["values"][0][0], "Time");
    }
}
