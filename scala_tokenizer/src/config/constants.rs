pub mod compile_time {
    pub mod file_processing {
        /// Maximum file size accepted for tokenization (10MB)
        /// SECURITY: Bounds memory held per submission
        pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

        /// Threshold for considering a file "large" (1MB)
        pub const LARGE_FILE_THRESHOLD: u64 = 1024 * 1024;

        /// Extension of Scala source files, without the dot
        pub const SCALA_EXTENSION: &str = "scala";
    }

    pub mod lexical {
        /// Lexemes that may never merge with a following operator
        pub const HARD_PUNCTUATION: &[u8] = b"()[]{};";

        /// Initial capacity of the pending lexeme buffer
        pub const PENDING_BUFFER_CAPACITY: usize = 64;

        /// Rough bytes-per-token ratio used to pre-size token vectors
        pub const BYTES_PER_TOKEN_ESTIMATE: usize = 4;

        /// Upper bound on the token vector reserved before a scan starts
        pub const MAX_INITIAL_TOKEN_CAPACITY: usize = 4096;
    }

    pub mod batch_processing {
        /// Upper bound on worker threads for directory tokenization
        /// RESOURCE: Each worker holds one file's bytes and tokens at a time
        pub const MAX_WORKER_THREADS: usize = 8;

        /// Maximum number of files accepted in a single batch
        pub const MAX_FILES_PER_BATCH: usize = 10_000;

        /// Extensions tokenized when none are configured
        pub const DEFAULT_EXTENSIONS: &[&str] = &["scala"];
    }

    pub mod logging {
        /// Maximum key/value pairs kept on a single log event
        pub const MAX_LOG_CONTEXT_ENTRIES: usize = 32;

        /// Capacity hint for the in-memory test logger
        pub const MEMORY_LOGGER_CAPACITY: usize = 256;
    }
}
