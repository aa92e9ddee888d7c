pub mod config;
pub mod download;
pub mod item;
pub mod metrics;
pub mod pool;
pub mod service;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DefaultSettings,
    DownloadConfig, ServiceConfig,
};
pub use download::{BulkDownloader, DownloadSink, FsSink, SinkError};
pub use item::{
    ConversionItem, HandleRegistry, ItemStatus, ItemStore, ItemView, ReadyResult, SourceImage,
    TransientHandle,
};
pub use pool::{BulkOutcome, ConversionPool, PoolConfig, PoolError};
pub use service::{
    extension_for, output_name, ConversionSettings, ConvertError, ConvertService, ConvertedImage,
    FormatCapabilities, HttpConvertService, PREFERRED_FORMAT,
};
