use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zahani_core::apoc::{
    sections, validate_section, visible_sections, Section, SectionData, SectionId, SectionState,
    ValidationResult,
};
use zahani_core::{
    CaseData, CaseId, CoreConfig, Gender, PatientSummary, StoreKind, StrokeClassification,
    WorkflowService, DEFAULT_DATA_DIR,
};

#[derive(Parser)]
#[command(name = "zahani")]
#[command(about = "ZahaniFlow APOC clinical documentation workflow CLI")]
struct Cli {
    /// Directory holding workflow progress files
    #[arg(long, global = true, env = "ZAHANI_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Patient and case attributes that decide conditional sections.
#[derive(Args, Clone, Debug, Default)]
struct PatientArgs {
    /// Patient gender (Male, Female or Other)
    #[arg(long)]
    gender: Option<Gender>,
    /// Patient age in whole years
    #[arg(long, allow_negative_numbers = true)]
    age: Option<i32>,
    /// Stroke classification of the case (ischemic, hemorrhagic, tia, n/a)
    #[arg(long)]
    stroke: Option<String>,
}

impl PatientArgs {
    fn patient(&self) -> PatientSummary {
        PatientSummary::new(self.gender, self.age)
    }

    fn case(&self) -> CaseData {
        self.stroke
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| CaseData::with_stroke(StrokeClassification::from_wire(s)))
            .unwrap_or_default()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List every section in workflow order
    Sections,
    /// List the sections that apply to a patient and case
    Visible {
        #[command(flatten)]
        patient: PatientArgs,
    },
    /// Validate a section payload without recording it
    Validate {
        /// Section identifier, e.g. vital_signs
        section: SectionId,
        /// Section payload as a JSON object
        #[arg(long)]
        data: String,
    },
    /// Start the documentation workflow for a case
    Start {
        /// Case identifier (32 lowercase hex characters)
        case_id: CaseId,
    },
    /// Validate a section and record it as completed
    Submit {
        /// Case identifier (32 lowercase hex characters)
        case_id: CaseId,
        /// Section identifier, e.g. vital_signs
        section: SectionId,
        /// Section payload as a JSON object
        #[arg(long)]
        data: String,
        #[command(flatten)]
        patient: PatientArgs,
    },
    /// Show progress for a case
    Progress {
        /// Case identifier (32 lowercase hex characters)
        case_id: CaseId,
        #[command(flatten)]
        patient: PatientArgs,
    },
    /// Print a freshly generated case identifier
    NewCaseId,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("zahani_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Sections) => {
            for section in sections() {
                print_section(section);
            }
        }
        Some(Commands::Visible { patient }) => {
            for section in visible_sections(&patient.patient(), &patient.case()) {
                print_section(section);
            }
        }
        Some(Commands::Validate { section, data }) => {
            let data = parse_data(&data)?;
            let result = validate_section(section, &data);
            ensure_valid(section, &result)?;
            println!("{} is valid", section);
        }
        Some(Commands::Start { case_id }) => {
            let service = file_service(&cli.data_dir)?;
            let progress = service.start(&case_id)?;
            println!(
                "Started workflow for case {} ({}% complete)",
                case_id,
                progress.overall_progress()
            );
        }
        Some(Commands::Submit {
            case_id,
            section,
            data,
            patient,
        }) => {
            let data = parse_data(&data)?;
            let service = file_service(&cli.data_dir)?;
            let outcome = service.submit_section(
                &case_id,
                section,
                &data,
                &patient.patient(),
                &patient.case(),
            )?;
            ensure_valid(section, &outcome.validation)?;
            println!(
                "Recorded {} for case {} ({}% complete)",
                section,
                case_id,
                outcome.progress.overall_progress()
            );
        }
        Some(Commands::Progress { case_id, patient }) => {
            let service = file_service(&cli.data_dir)?;
            let overview = service.overview(&case_id, &patient.patient(), &patient.case())?;
            for status in &overview.sections {
                let mark = match status.state {
                    SectionState::Completed => "x",
                    SectionState::NotStarted => " ",
                };
                let current = if status.is_current { "  <- next" } else { "" };
                println!("[{}] {:>2}. {}{}", mark, status.order, status.title, current);
            }
            println!("Overall: {}%", overview.overall_progress);
        }
        Some(Commands::NewCaseId) => {
            println!("{}", CaseId::new());
        }
        None => {
            println!("Use 'zahani --help' for commands");
        }
    }

    Ok(())
}

/// Builds a file-backed service, creating the data directory on first use.
fn file_service(data_dir: &Path) -> anyhow::Result<WorkflowService> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;
    let cfg = CoreConfig::new(data_dir.to_path_buf(), StoreKind::File)?;
    Ok(WorkflowService::from_config(&cfg))
}

fn parse_data(raw: &str) -> anyhow::Result<SectionData> {
    serde_json::from_str(raw).context("--data must be a JSON object")
}

fn print_section(section: &Section) {
    let conditional = if section.is_conditional() {
        " (conditional)"
    } else {
        ""
    };
    println!(
        "{:>2}. {} [{}]{}",
        section.order, section.title, section.id, conditional
    );
}

/// Prints the rule messages and fails the command when `result` is invalid.
fn ensure_valid(section: SectionId, result: &ValidationResult) -> anyhow::Result<()> {
    if result.is_valid {
        return Ok(());
    }
    for error in &result.errors {
        eprintln!("  - {}", error);
    }
    anyhow::bail!(
        "{} failed validation ({} error(s))",
        section,
        result.errors.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_submit_with_patient_flags() {
        let cli = Cli::try_parse_from([
            "zahani",
            "submit",
            "550e8400e29b41d4a716446655440000",
            "vital_signs",
            "--data",
            r#"{"vitalSignsSpo2": 98}"#,
            "--gender",
            "female",
            "--age",
            "12",
            "--stroke",
            "tia",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Submit {
                section, patient, ..
            }) => {
                assert_eq!(section, SectionId::VitalSigns);
                assert_eq!(
                    patient.patient(),
                    PatientSummary::new(Some(Gender::Female), Some(12))
                );
                assert_eq!(
                    patient.case(),
                    CaseData::with_stroke(StrokeClassification::Tia)
                );
            }
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn blank_stroke_flag_means_no_classification() {
        let args = PatientArgs {
            stroke: Some("  ".into()),
            ..PatientArgs::default()
        };
        assert_eq!(args.case(), CaseData::default());
    }

    #[test]
    fn rejects_non_canonical_case_id() {
        assert!(Cli::try_parse_from(["zahani", "start", "not-a-case"]).is_err());
    }

    #[test]
    fn invalid_section_fails_the_command() {
        let data = parse_data(r#"{"vitalSignsSpo2": 101}"#).unwrap();
        let result = validate_section(SectionId::VitalSigns, &data);
        let err = ensure_valid(SectionId::VitalSigns, &result).unwrap_err();
        assert!(err.to_string().contains("vital_signs failed validation"));

        let data = parse_data(r#"{"vitalSignsSpo2": 97}"#).unwrap();
        let result = validate_section(SectionId::VitalSigns, &data);
        assert!(ensure_valid(SectionId::VitalSigns, &result).is_ok());
    }

    #[test]
    fn rejected_submission_fails_and_records_nothing() {
        let temp = tempfile::TempDir::new().unwrap();
        let service = file_service(&temp.path().join("data")).unwrap();
        let case_id = CaseId::new();
        service.start(&case_id).unwrap();

        let data = parse_data(r#"{"chiefComplaint": "pain"}"#).unwrap();
        let outcome = service
            .submit_section(
                &case_id,
                SectionId::ChiefComplaint,
                &data,
                &PatientSummary::default(),
                &CaseData::default(),
            )
            .unwrap();
        assert!(ensure_valid(SectionId::ChiefComplaint, &outcome.validation).is_err());
        assert_eq!(service.progress(&case_id).unwrap().overall_progress(), 0);
    }

    #[test]
    fn data_must_be_a_json_object() {
        assert!(parse_data(r#"{"chiefComplaint": "headache"}"#).is_ok());
        assert!(parse_data("[1, 2]").is_err());
    }
}
