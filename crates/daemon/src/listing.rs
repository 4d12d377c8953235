use log::warn;
use vitrine_engine::{ScanError, to_stored_record};
use vitrine_protocol::{DaemonResponse, ListRequest, ListResponse, ListedFile, RecordRequest};

use crate::state::DaemonState;

pub fn execute_list(state: &DaemonState, req: &ListRequest) -> DaemonResponse {
    match state.scanner().scan(&req.path) {
        Ok(mut entries) => {
            state.decorator().decorate_all(&mut entries);
            DaemonResponse::Listing(ListResponse {
                path: req.path.clone(),
                entries: entries.into_iter().map(ListedFile::from).collect(),
            })
        }
        Err(ScanError::NotFound(path)) => DaemonResponse::NotFound(path),
        Err(e) => {
            warn!("[list] {e}");
            DaemonResponse::Error("failed to read directory".to_owned())
        }
    }
}

pub fn execute_record(state: &DaemonState, req: &RecordRequest) -> DaemonResponse {
    match state.scanner().lookup(&req.path) {
        Ok(record) => DaemonResponse::Record(record.map(to_stored_record)),
        Err(e) => DaemonResponse::Error(format!("Record lookup failed: {e}")),
    }
}
