use crate::pipeline::{Board, BoardLayout, BoardPage};
use crate::selector::BatchWindow;
use serde_json::{Value, json};

/// Serialize a board layout as `{ window, pages, warnings, meta }`.
/// `page_names` optionally names the image file written for each page.
pub fn board_to_json(board: &Board, page_names: &[String]) -> Value {
    pages_to_json(
        &board.window,
        &board.pages,
        page_names,
        json!({
            "warnings": &board.warnings,
            "stats": &board.stats,
        }),
    )
}

/// Same shape as [`board_to_json`] for a layout planned without decoding pixels.
pub fn layout_to_json(layout: &BoardLayout) -> Value {
    pages_to_json(
        &layout.window,
        &layout.pages(),
        &[],
        json!({
            "warnings": &layout.warnings,
            "stats": layout.stats(),
        }),
    )
}

fn pages_to_json(
    window: &BatchWindow,
    pages: &[BoardPage],
    page_names: &[String],
    extra: Value,
) -> Value {
    let pages_val: Vec<Value> = pages
        .iter()
        .map(|p| {
            let placements: Vec<Value> = p
                .placements
                .iter()
                .map(|pl| {
                    json!({
                        "path": pl.path.to_string_lossy().replace('\\', "/"),
                        "frame": {
                            "x": pl.frame.x,
                            "y": pl.frame.y,
                            "w": pl.frame.w,
                            "h": pl.frame.h,
                        },
                    })
                })
                .collect();
            let mut page = json!({
                "id": p.id,
                "size": {"w": p.width, "h": p.height},
                "placements": placements,
            });
            if let Some(name) = page_names.get(p.id) {
                page["image"] = json!(name);
            }
            page
        })
        .collect();
    let mut out = json!({
        "window": {
            "start": window.start_index,
            "count": window.count,
            "catalogLen": window.catalog_len,
            "indices": window.indices().collect::<Vec<_>>(),
        },
        "pages": pages_val,
        "meta": {
            "app": "moodboard",
            "version": env!("CARGO_PKG_VERSION"),
            "format": "RGBA8888",
        },
    });
    if let (Some(obj), Value::Object(extra)) = (out.as_object_mut(), extra) {
        obj.extend(extra);
    }
    out
}
