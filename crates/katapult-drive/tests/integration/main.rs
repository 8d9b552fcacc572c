//! Integration tests for katapult-drive
//!
//! Uses wiremock to simulate the Drive v2 API and verifies end-to-end
//! behavior of listing, folder creation, uploads, patches and error
//! classification through the `IRemoteStore` port.

mod common;

mod test_errors;
mod test_files;
mod test_upload;
