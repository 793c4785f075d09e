pub mod plugin;

pub use plugin::{
    NativeScanRequest, NativeScanResponse, NativeScannerPlugin, PermissionState, PluginError,
};
