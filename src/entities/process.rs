//! Manufacturing process reference data
//!
//! Typical achievable tolerances and capability indices per process, used to
//! auto-fill dimensions. The analysis engine never consults this table.

use serde::Serialize;
use tabled::Tabled;

/// Typical capability of a manufacturing process
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Tabled)]
pub struct ProcessCapability {
    /// Process name
    #[tabled(rename = "PROCESS")]
    pub process: &'static str,

    /// Typical symmetric tolerance (± mm)
    #[tabled(rename = "TYPICAL TOL (±mm)")]
    pub typical_tol: f64,

    /// Minimum capability index the process usually holds
    #[tabled(rename = "MIN CPK")]
    pub min_cpk: f64,

    /// Relative cost, 1 (low) to 5 (high)
    #[tabled(rename = "COST")]
    pub cost_factor: u8,
}

/// ISO tolerance grade guide entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Tabled)]
pub struct ItGrade {
    #[tabled(rename = "GRADE")]
    pub grade: &'static str,

    #[tabled(rename = "TYPICAL USE")]
    pub description: &'static str,

    /// Representative tolerance (mm)
    #[tabled(rename = "TOL (mm)")]
    pub value: f64,
}

pub const MANUFACTURING_PROCESSES: &[ProcessCapability] = &[
    ProcessCapability {
        process: "CNC Milling (Standard)",
        typical_tol: 0.05,
        min_cpk: 1.33,
        cost_factor: 2,
    },
    ProcessCapability {
        process: "CNC Milling (Precision)",
        typical_tol: 0.01,
        min_cpk: 1.33,
        cost_factor: 4,
    },
    ProcessCapability {
        process: "Turning (Standard)",
        typical_tol: 0.05,
        min_cpk: 1.33,
        cost_factor: 2,
    },
    ProcessCapability {
        process: "Grinding",
        typical_tol: 0.005,
        min_cpk: 1.67,
        cost_factor: 5,
    },
    ProcessCapability {
        process: "Injection Molding (General)",
        typical_tol: 0.2,
        min_cpk: 1.33,
        cost_factor: 1,
    },
    ProcessCapability {
        process: "Injection Molding (Technical)",
        typical_tol: 0.05,
        min_cpk: 1.33,
        cost_factor: 3,
    },
    ProcessCapability {
        process: "3D Printing (FDM)",
        typical_tol: 0.3,
        min_cpk: 1.0,
        cost_factor: 1,
    },
    ProcessCapability {
        process: "3D Printing (SLA)",
        typical_tol: 0.1,
        min_cpk: 1.0,
        cost_factor: 2,
    },
    ProcessCapability {
        process: "Sheet Metal Bending",
        typical_tol: 0.5,
        min_cpk: 1.0,
        cost_factor: 1,
    },
];

pub const IT_GRADES: &[ItGrade] = &[
    ItGrade {
        grade: "IT5",
        description: "Precision Engineering (Grinding)",
        value: 0.01,
    },
    ItGrade {
        grade: "IT7",
        description: "High Quality Machining (Milling/Turning)",
        value: 0.03,
    },
    ItGrade {
        grade: "IT9",
        description: "General Machining",
        value: 0.1,
    },
    ItGrade {
        grade: "IT11",
        description: "Punching / Coarse Machining",
        value: 0.3,
    },
    ItGrade {
        grade: "IT13",
        description: "Casting / Forging",
        value: 1.0,
    },
];

/// Find a process by name (case-insensitive, surrounding whitespace ignored)
pub fn find_process(name: &str) -> Option<&'static ProcessCapability> {
    let needle = name.trim();
    MANUFACTURING_PROCESSES
        .iter()
        .find(|p| p.process.eq_ignore_ascii_case(needle))
}
