//! Scheduled export pipeline construct
//!
//! Declares the IAM roles, instance profile and Data Pipeline manifest for
//! a scheduled table-to-bucket export running on a transient EMR cluster.
//! Pure manifest synthesis; no AWS calls are made.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Configuration record and enums
pub mod types;

pub use types::{ExportPipelineProps, FailureAndRerunMode, ScheduleType, TimePeriod, TimeUnit};

use manifest::{ManifestResult, PipelineDefinition, PipelineField, PipelineObject, Stack};
use serde_json::json;

// Object ids are fixed regardless of configuration.
const EXPORT_FORMAT_ID: &str = "DDBExportFormat";
const SOURCE_TABLE_ID: &str = "DDBSourceTable";
const BACKUP_LOCATION_ID: &str = "S3BackupLocation";
const BACKUP_ACTIVITY_ID: &str = "TableBackupActivity";
const SCHEDULE_ID: &str = "DefaultSchedule";
const DEFAULT_OBJECT_ID: &str = "Default";
const EMR_CLUSTER_ID: &str = "EmrClusterForBackup";

const DEFAULT_READ_THROUGHPUT_RATIO: f64 = 0.25;

// Resolved by the pipeline scheduler at each run, not at synthesis time.
const SCHEDULED_START_TIME_TOKEN: &str = "#{format(@scheduledStartTime, 'YYYY-MM-dd-HH-mm-ss')}";

/// Scheduled table export pipeline
#[derive(Debug)]
pub struct ExportPipeline;

impl ExportPipeline {
    /// Declares the pipeline roles, instance profile and definition
    ///
    /// Child logical ids are prefixed with `id`. The pipeline definition
    /// always carries the same seven objects; configuration only changes
    /// their field values.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::DuplicateLogicalId` if a child logical id is
    /// already declared in the stack. The definition's reference graph is
    /// fixed, so assembly itself cannot fail on well-formed input.
    pub fn build(stack: &mut Stack, id: &str, props: &ExportPipelineProps) -> ManifestResult<()> {
        let role_id = format!("{id}DataPipelineDefaultRole");
        let resource_role_id = format!("{id}DataPipelineDefaultResourceRole");

        stack.add_resource(
            &role_id,
            "AWS::IAM::Role",
            json!({
                "AssumeRolePolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": {
                            "Service": [
                                "datapipeline.amazonaws.com",
                                "elasticmapreduce.amazonaws.com",
                            ],
                        },
                        "Action": "sts:AssumeRole",
                    }],
                },
                "ManagedPolicyArns": [
                    "arn:aws:iam::aws:policy/service-role/AWSDataPipelineRole",
                ],
            }),
        )?;

        stack.add_resource(
            &resource_role_id,
            "AWS::IAM::Role",
            json!({
                "AssumeRolePolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": { "Service": ["ec2.amazonaws.com"] },
                        "Action": "sts:AssumeRole",
                    }],
                },
                "ManagedPolicyArns": [
                    "arn:aws:iam::aws:policy/service-role/AmazonEC2RoleforDataPipelineRole",
                ],
            }),
        )?;

        // The instance profile mirrors the resource role's name.
        stack.add_resource(
            &format!("{id}InstanceProfile"),
            "AWS::IAM::InstanceProfile",
            json!({
                "InstanceProfileName": Stack::reference(&resource_role_id),
                "Roles": [Stack::reference(&resource_role_id)],
            }),
        )?;

        let definition = Self::pipeline_definition(props, &role_id, &resource_role_id)?;

        stack.add_resource(
            &format!("{id}Pipeline"),
            "AWS::DataPipeline::Pipeline",
            json!({
                "Name": format!("{id}Pipeline"),
                "PipelineObjects": definition,
            }),
        )?;

        tracing::debug!(construct_id = id, "declared export pipeline");

        Ok(())
    }

    fn pipeline_definition(
        props: &ExportPipelineProps,
        role_id: &str,
        resource_role_id: &str,
    ) -> ManifestResult<PipelineDefinition> {
        let read_throughput = props
            .read_throughput_ratio
            .unwrap_or(DEFAULT_READ_THROUGHPUT_RATIO);
        let resize_cluster = props.resize_cluster_before_running.unwrap_or(true);

        PipelineDefinition::new(vec![
            PipelineObject::new(
                EXPORT_FORMAT_ID,
                vec![PipelineField::string("type", "DynamoDBExportDataFormat")],
            ),
            PipelineObject::new(
                SOURCE_TABLE_ID,
                vec![
                    PipelineField::string("type", "DynamoDBDataNode"),
                    PipelineField::string("tableName", &props.table_name),
                    PipelineField::string("readThroughputPercent", read_throughput.to_string()),
                    PipelineField::reference("dataFormat", EXPORT_FORMAT_ID),
                ],
            ),
            PipelineObject::new(
                BACKUP_LOCATION_ID,
                vec![
                    PipelineField::string("type", "S3DataNode"),
                    PipelineField::string(
                        "directoryPath",
                        format!("s3://{}/{SCHEDULED_START_TIME_TOKEN}", props.bucket_name),
                    ),
                    PipelineField::reference("dataFormat", EXPORT_FORMAT_ID),
                ],
            ),
            PipelineObject::new(
                BACKUP_ACTIVITY_ID,
                vec![
                    PipelineField::string("type", "EmrActivity"),
                    PipelineField::reference("input", SOURCE_TABLE_ID),
                    PipelineField::reference("output", BACKUP_LOCATION_ID),
                    PipelineField::reference("runsOn", EMR_CLUSTER_ID),
                    PipelineField::string(
                        "resizeClusterBeforeRunning",
                        resize_cluster.to_string(),
                    ),
                ],
            ),
            PipelineObject::new(
                SCHEDULE_ID,
                vec![
                    PipelineField::string("type", "Schedule"),
                    PipelineField::string("occurrences", props.run_occurrences.to_string()),
                    PipelineField::string("startAt", "FIRST_ACTIVATION_DATE_TIME"),
                    PipelineField::string("period", props.period.to_string()),
                ],
            ),
            PipelineObject::new(
                DEFAULT_OBJECT_ID,
                vec![
                    PipelineField::string("scheduleType", props.schedule_type.to_string()),
                    PipelineField::string(
                        "failureAndRerunMode",
                        props.failure_and_rerun_mode.to_string(),
                    ),
                    PipelineField::string("role", Stack::reference(role_id)),
                    PipelineField::string("resourceRole", Stack::reference(resource_role_id)),
                    PipelineField::reference("schedule", SCHEDULE_ID),
                ],
            ),
            PipelineObject::new(
                EMR_CLUSTER_ID,
                vec![
                    PipelineField::string("type", "EmrCluster"),
                    PipelineField::string(
                        "terminateAfter",
                        props.emr_terminate_after.to_string(),
                    ),
                ],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn props() -> ExportPipelineProps {
        ExportPipelineProps {
            table_name: "Orders".to_string(),
            bucket_name: "backup-bucket".to_string(),
            read_throughput_ratio: None,
            resize_cluster_before_running: None,
            emr_terminate_after: TimePeriod::new(1, TimeUnit::Hour),
            period: TimePeriod::new(1, TimeUnit::Day),
            run_occurrences: 1,
            schedule_type: ScheduleType::Cron,
            failure_and_rerun_mode: FailureAndRerunMode::None,
        }
    }

    #[test]
    fn test_definition_has_fixed_object_ids() {
        let definition =
            ExportPipeline::pipeline_definition(&props(), "Role", "ResourceRole").unwrap();

        let ids: Vec<&str> = definition
            .objects()
            .iter()
            .map(|object| object.id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec![
                "DDBExportFormat",
                "DDBSourceTable",
                "S3BackupLocation",
                "TableBackupActivity",
                "DefaultSchedule",
                "Default",
                "EmrClusterForBackup",
            ]
        );
    }

    #[test]
    fn test_optional_fields_fall_back_to_template_defaults() {
        let definition =
            ExportPipeline::pipeline_definition(&props(), "Role", "ResourceRole").unwrap();

        let source_table = definition.object("DDBSourceTable").unwrap();
        assert_eq!(source_table.string_value("readThroughputPercent"), Some("0.25"));

        let activity = definition.object("TableBackupActivity").unwrap();
        assert_eq!(
            activity.string_value("resizeClusterBeforeRunning"),
            Some("true")
        );
    }

    #[test]
    fn test_directory_path_interpolates_bucket_and_start_time() {
        let definition =
            ExportPipeline::pipeline_definition(&props(), "Role", "ResourceRole").unwrap();

        let location = definition.object("S3BackupLocation").unwrap();
        assert_eq!(
            location.string_value("directoryPath"),
            Some("s3://backup-bucket/#{format(@scheduledStartTime, 'YYYY-MM-dd-HH-mm-ss')}")
        );
    }

    #[test]
    fn test_schedule_fields() {
        let definition =
            ExportPipeline::pipeline_definition(&props(), "Role", "ResourceRole").unwrap();

        let schedule = definition.object("DefaultSchedule").unwrap();
        assert_eq!(schedule.string_value("occurrences"), Some("1"));
        assert_eq!(schedule.string_value("startAt"), Some("FIRST_ACTIVATION_DATE_TIME"));
        assert_eq!(schedule.string_value("period"), Some("1 Day"));
    }

    #[test]
    fn test_defaults_object_references_roles_and_schedule() {
        let definition =
            ExportPipeline::pipeline_definition(&props(), "Role", "ResourceRole").unwrap();

        let defaults = definition.object("Default").unwrap();
        assert_eq!(defaults.string_value("scheduleType"), Some("cron"));
        assert_eq!(defaults.string_value("failureAndRerunMode"), Some("NONE"));
        assert_eq!(defaults.string_value("role"), Some("${Role}"));
        assert_eq!(defaults.string_value("resourceRole"), Some("${ResourceRole}"));

        let schedule_ref = defaults
            .fields
            .iter()
            .find(|field| field.key == "schedule")
            .unwrap();
        assert_eq!(schedule_ref.ref_value.as_deref(), Some("DefaultSchedule"));
    }

    #[test]
    fn test_cluster_terminate_after() {
        let definition =
            ExportPipeline::pipeline_definition(&props(), "Role", "ResourceRole").unwrap();

        let cluster = definition.object("EmrClusterForBackup").unwrap();
        assert_eq!(cluster.string_value("type"), Some("EmrCluster"));
        assert_eq!(cluster.string_value("terminateAfter"), Some("1 Hour"));
    }
}
