// Stable, machine-readable error codes returned in every API error body.
// Codes never change meaning once published; add new ones at the end of a group.

pub mod validation {
    pub const BAD_TIMESTAMP: &str = "VALIDATION_1001";
    pub const MISSING_VARIANT_FIELD: &str = "VALIDATION_1002";
    pub const UNKNOWN_KIND: &str = "VALIDATION_1003";
    pub const UNKNOWN_PATIENT: &str = "VALIDATION_1004";
    pub const INVALID_INPUT: &str = "VALIDATION_1005";
}

pub mod authentication {
    pub const MISSING_CREDENTIALS: &str = "AUTH_2001";
    pub const INVALID_CREDENTIALS: &str = "AUTH_2002";
    pub const UNKNOWN_ROLE: &str = "AUTH_2003";
    pub const STORE_UNAVAILABLE: &str = "AUTH_2004";
}

pub mod authorization {
    pub const FORBIDDEN: &str = "AUTHZ_3001";
}

pub mod database {
    pub const CONNECTION_FAILED: &str = "DB_4001";
    pub const QUERY_FAILED: &str = "DB_4002";
    pub const CONSTRAINT_VIOLATION: &str = "DB_4003";
    pub const NOT_FOUND: &str = "DB_4004";
}

pub mod appointment {
    pub const NOT_FOUND: &str = "APPT_5001";
    pub const INVALID_TRANSITION: &str = "APPT_5002";
    pub const DIRECTORY_UNAVAILABLE: &str = "APPT_5003";
}

pub mod upstream {
    pub const DRUG_LOOKUP_FAILED: &str = "UPSTREAM_6001";
}

pub mod system {
    pub const INTERNAL: &str = "SYS_9001";
}
