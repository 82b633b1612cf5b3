/// Warning feed ingestion.
///
/// Submodules:
/// - `smhi`    : feed decoding and the single-shot `WarningFetcher`.
/// - `fixtures` (test only): representative feed payloads.

pub mod smhi;

#[cfg(test)]
pub(crate) mod fixtures;
