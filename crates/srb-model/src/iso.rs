//! ISO documentation reference shown on the final, informational step

use serde::Serialize;

/// One documentation level (L1–L5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IsoSection {
    pub key: &'static str,
    pub title: &'static str,
    pub content: &'static [&'static str],
}

/// L1–L5 reference sections
pub const ISO_REFERENCE: [IsoSection; 5] = [
    IsoSection {
        key: "L1",
        title: "L1 - Policy: Purpose of the Safety Review Board",
        content: &[
            "The Safety Review Board provides a structured, multi-stakeholder review for any task where the initial hazard assessment identifies High (8-11) or Extreme (12-16) risk scores.",
            "No activity with an unmitigated High or Extreme risk may commence until the SRB process is completed, all risks are reduced to LOW (1-3), and the three mandatory signatories have signed off.",
        ],
    },
    IsoSection {
        key: "L2",
        title: "L2 - Process: SRB Workflow Steps",
        content: &[
            "Step 1: Pre-SRB escalation questions identify the trigger condition and service order number.",
            "Step 2: Original hazards and team composition are reviewed. Original hazard values remain unchanged.",
            "Step 3: Each escalated hazard is reassessed with additional controls until its score reaches LOW (1-3).",
            "Step 4: All participants answer the six post-mitigation acknowledgement questions.",
            "Step 5: EHS Specialist, Fab Team Lead and CS Management Representative sign with timestamps.",
            "Step 6: The completed record is stored against the originating safety plan for audit retrieval.",
        ],
    },
    IsoSection {
        key: "L3",
        title: "L3 - Work Instructions: Detailed SRB Procedure",
        content: &[
            "Hazards above the escalation threshold are flagged and work may not commence without a completed SRB.",
            "Each escalated hazard is reassessed individually; additional safety measures must go beyond the original plan and the mitigation plan must be specific and actionable.",
            "The board may not proceed to sign-off while any reassessed score exceeds the LOW band.",
            "All signatories provide full name, signature and timestamp.",
        ],
    },
    IsoSection {
        key: "L4",
        title: "L4 - Forms, Templates & Checklists",
        content: &[
            "SRB-001 Pre-SRB escalation questions.",
            "SRB-002 Original hazard record (read-only, frozen from the safety plan).",
            "SRB-003 Hazard reassessment matrix (before/after scoring).",
            "SRB-004 Six-point acknowledgement checklist.",
            "SRB-005 Three-party signature sheet with timestamps.",
        ],
    },
    IsoSection {
        key: "L5",
        title: "L5 - Records Generated",
        content: &[
            "SRB record linked to the originating safety plan.",
            "Pre-SRB answers with service order reference.",
            "Frozen original hazard snapshot.",
            "Reassessment records with before/after scores, measures and mitigation plans.",
            "Acknowledgements and timestamped signatures.",
        ],
    },
];
