//! Constants used throughout the codebase.
//!
//! Wire method names are part of the contract with the command runner and
//! must not change.

/// JSON-RPC protocol version stamped on every wire command.
pub const JSONRPC_VERSION: &str = "2.0";

/// Synthetic directive: block until the response for `params.id` arrives.
pub const WAIT_FOR_RESPONSE_METHOD: &str = "$test/waitForResponse";

/// Synthetic directive: block until a matching server request arrives, then answer it.
pub const WAIT_FOR_REQUEST_METHOD: &str = "$test/waitForRequest";

/// Synthetic directive: block until a matching server notification arrives.
pub const WAIT_FOR_NOTIFICATION_METHOD: &str = "$test/waitForNotification";

/// Prefix of transcript keys for entries created by client requests.
pub const CLIENT_REQUEST_KEY_PREFIX: &str = "_client_request_";

/// Response field carrying the subsystem that produced a result.
pub const POWERED_BY_FIELD: &str = "powered_by";

/// Gutter separator in source listings.
pub const GUTTER_BAR: char = '\u{2502}';

/// Width reserved for line numbers in source listings.
pub const GUTTER_WIDTH: usize = 5;

/// Indentation used for remediation snippets and payload dumps.
pub const SNIPPET_INDENT: &str = "    ";

/// Name of the optional configuration file looked up in a project root.
pub const CONFIG_FILE_NAME: &str = "lsp-testspec.toml";

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV_VAR: &str = "LSP_TESTSPEC_LOG";

/// Placeholder written into remediation snippets where the author must supply data.
pub const FILL_IN_MARKER: &str = "@nocommit";
