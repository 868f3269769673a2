// public
pub mod manifest;
pub mod rib;

mod database;
pub use database::{
    batch_operations::{
        BatchOperationAction, BatchOperationColumnBehavior, BatchOperationSqlType, ColumnDefinition,
    },
    postgres::{
        client::{PostgresClient, PostgresConnectionError, PostgresError, StatementExecutor},
        sql_type_wrapper::RibSqlTypeWrapper,
    },
};

mod logger;
pub use logger::{log_level_from_str, setup_info_logger, setup_logger};

mod sink;
pub use sink::{write_prefix_batch, WriteBatchError, WriteSummary};

pub use rib::{
    assembler::{assemble, AssembleError, BuiltStatement, Statement, StatementBuilder},
    encode::{EncodeDiagnostic, EncodeError, EncodedValues, TruncatedBits},
    evpn::EvpnPrefixRecord,
    family::{AddressFamily, BatchOptions, PrefixBatch, PrefixRecord},
    l3vpn::L3VpnPrefixRecord,
    template::StatementTemplate,
};

// export 3rd party dependencies
pub use async_trait::async_trait;
pub use tokio::main as ribsink_main;
pub use tracing::{error as ribsink_error, info as ribsink_info, level_filters::LevelFilter};
