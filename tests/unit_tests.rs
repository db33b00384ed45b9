//! Entry point for the per-component unit tests under `tests/unit/`.

mod unit;
