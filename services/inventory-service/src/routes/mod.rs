use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers::*, AppState};

pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/chemicals", post(receive_chemical).get(list_chemicals))
        .route("/chemicals/export.csv", get(export_chemicals_csv))
        .route("/chemicals/:id", get(get_chemical))
        .route("/chemicals/:id/written-off", put(set_written_off))
        .route("/chemicals/:id/client-test", put(update_client_test))
        .route("/chemicals/:id/movements", get(chemical_movements))
        .route("/dispatch", post(dispatch_chemical))
        .route("/movements", get(list_movements))
        .route("/summary", get(inventory_summary))
        .route("/labels", get(label_sheet))
        .nest("/portal", portal_routes())
}

fn portal_routes() -> Router<AppState> {
    Router::new()
        .route("/lookup", get(client_lookup))
        .route("/reports/:sample_id", post(upload_report).get(download_report))
}
