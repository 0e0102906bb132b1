//! EC2 instance and network interface operations

use super::context::AwsContext;
use super::error::{AwsError, classify_sdk_error};
use crate::wait::{WaitConfig, wait_for_resource};
use asg_nic_common::InstanceSnapshot;
use asg_nic_common::defaults::MANAGEMENT_DEVICE_INDEX;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::types::{
    AttachmentStatus, Instance, NetworkInterface, NetworkInterfaceAttachmentChanges,
    NetworkInterfaceStatus, ResourceType, Tag, TagSpecification,
};
use tracing::{debug, info, warn};

/// EC2 client for describing instances and managing network interfaces
pub struct Ec2Client {
    client: Client,
    detach_wait: WaitConfig,
}

impl Ec2Client {
    /// Create an EC2 client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ec2_client(),
            detach_wait: WaitConfig::default(),
        }
    }

    /// Describe one instance and reduce it to an [`InstanceSnapshot`]
    pub async fn describe_instance(&self, instance_id: &str) -> Result<InstanceSnapshot, AwsError> {
        let response = self
            .client
            .describe_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        let instance = response
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .next()
            .ok_or_else(|| AwsError::NotFound {
                code: "InvalidInstanceID.NotFound".to_string(),
                message: format!("instance {instance_id} not in DescribeInstances response"),
            })?;

        let snapshot = snapshot_from_instance(instance)?;
        debug!(
            instance_id = %instance_id,
            zone = %snapshot.availability_zone,
            interfaces = snapshot.network_interface_count,
            "Described instance"
        );
        Ok(snapshot)
    }

    /// Create a network interface and return its id
    pub async fn create_interface(
        &self,
        subnet_id: &str,
        security_group_id: &str,
        description: &str,
        tags: TagSpecification,
    ) -> Result<String, AwsError> {
        info!(subnet_id = %subnet_id, security_group_id = %security_group_id, "Creating network interface");

        let response = self
            .client
            .create_network_interface()
            .subnet_id(subnet_id)
            .groups(security_group_id)
            .description(description)
            .tag_specifications(tags)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        let interface_id = response
            .network_interface()
            .and_then(|ni| ni.network_interface_id())
            .ok_or(AwsError::MissingField("NetworkInterface.NetworkInterfaceId"))?
            .to_string();

        info!(interface_id = %interface_id, "Created network interface");
        Ok(interface_id)
    }

    /// Attach an interface at the management device index and return the attachment id
    pub async fn attach_interface(
        &self,
        interface_id: &str,
        instance_id: &str,
    ) -> Result<String, AwsError> {
        let response = self
            .client
            .attach_network_interface()
            .network_interface_id(interface_id)
            .instance_id(instance_id)
            .device_index(MANAGEMENT_DEVICE_INDEX)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        let attachment_id = response
            .attachment_id()
            .ok_or(AwsError::MissingField("AttachmentId"))?
            .to_string();

        info!(
            interface_id = %interface_id,
            instance_id = %instance_id,
            attachment_id = %attachment_id,
            "Attached network interface"
        );
        Ok(attachment_id)
    }

    /// Set DeleteOnTermination on an interface attachment
    pub async fn mark_delete_on_termination(
        &self,
        attachment_id: &str,
        interface_id: &str,
    ) -> Result<(), AwsError> {
        self.client
            .modify_network_interface_attribute()
            .network_interface_id(interface_id)
            .attachment(
                NetworkInterfaceAttachmentChanges::builder()
                    .attachment_id(attachment_id)
                    .delete_on_termination(true)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        debug!(interface_id = %interface_id, attachment_id = %attachment_id, "Marked delete-on-termination");
        Ok(())
    }

    /// Delete a network interface
    ///
    /// Returns Ok(()) if the interface was deleted or doesn't exist (idempotent for cleanup).
    /// An interface that is still attached is force-detached first, and the
    /// delete is only issued once it reports `available`.
    pub async fn delete_interface(&self, interface_id: &str) -> Result<(), AwsError> {
        let interface = self.describe_interface(interface_id).await?;

        match next_delete_step(interface.as_ref()) {
            DeleteStep::AlreadyDeleted => {
                debug!(interface_id = %interface_id, "Network interface already deleted");
                return Ok(());
            }
            DeleteStep::Detach { attachment_id } => {
                self.detach_interface(interface_id, &attachment_id).await?;
            }
            DeleteStep::Delete => {}
        }

        self.client
            .delete_network_interface()
            .network_interface_id(interface_id)
            .send()
            .await
            .map(|_| info!(interface_id = %interface_id, "Deleted network interface"))
            .or_else(|e| not_found_as_deleted(classify_sdk_error(&e)))
    }

    /// Describe one interface, mapping "not found" to `None`
    async fn describe_interface(
        &self,
        interface_id: &str,
    ) -> Result<Option<NetworkInterface>, AwsError> {
        match self
            .client
            .describe_network_interfaces()
            .network_interface_ids(interface_id)
            .send()
            .await
        {
            Ok(response) => Ok(response.network_interfaces().first().cloned()),
            Err(e) => not_found_as_deleted(classify_sdk_error(&e)).map(|()| None),
        }
    }

    /// Force-detach an interface and wait until it is available again
    async fn detach_interface(&self, interface_id: &str, attachment_id: &str) -> Result<(), AwsError> {
        warn!(
            interface_id = %interface_id,
            attachment_id = %attachment_id,
            "Interface still attached, detaching before delete"
        );

        self.client
            .detach_network_interface()
            .attachment_id(attachment_id)
            .force(true)
            .send()
            .await
            .map(|_| ())
            .or_else(|e| not_found_as_deleted(classify_sdk_error(&e)))?;

        wait_for_resource(
            self.detach_wait.clone(),
            move || async move {
                let interface = self.describe_interface(interface_id).await?;
                Ok::<_, AwsError>(is_detached(interface.as_ref()))
            },
            interface_id,
        )
        .await
    }
}

/// What deleting a described interface takes next
#[derive(Debug, Clone, PartialEq, Eq)]
enum DeleteStep {
    AlreadyDeleted,
    Detach { attachment_id: String },
    Delete,
}

fn next_delete_step(interface: Option<&NetworkInterface>) -> DeleteStep {
    match interface {
        None => DeleteStep::AlreadyDeleted,
        Some(interface) => match live_attachment_id(interface) {
            Some(attachment_id) => DeleteStep::Detach { attachment_id },
            None => DeleteStep::Delete,
        },
    }
}

/// Whether a detached interface can be deleted yet; a vanished one counts
fn is_detached(interface: Option<&NetworkInterface>) -> bool {
    interface.is_none_or(|i| i.status() == Some(&NetworkInterfaceStatus::Available))
}

/// A resource that no longer exists is already in the state cleanup wants
fn not_found_as_deleted(err: AwsError) -> Result<(), AwsError> {
    if err.is_not_found() { Ok(()) } else { Err(err) }
}

/// Reduce a described instance to the fields eligibility and subnet resolution need
pub(crate) fn snapshot_from_instance(instance: &Instance) -> Result<InstanceSnapshot, AwsError> {
    let availability_zone = instance
        .placement()
        .and_then(|p| p.availability_zone())
        .ok_or(AwsError::MissingField("Placement.AvailabilityZone"))?;

    Ok(InstanceSnapshot::new(
        availability_zone,
        instance.network_interfaces().len(),
    ))
}

/// Attachment id of an interface that is attached or attaching
fn live_attachment_id(interface: &NetworkInterface) -> Option<String> {
    let attachment = interface.attachment()?;
    if attachment.status() == Some(&AttachmentStatus::Detached) {
        return None;
    }
    attachment.attachment_id().map(str::to_string)
}

/// Build the TagSpecification for a management interface
pub(crate) fn interface_tag_spec(tags: &[(&str, String)]) -> TagSpecification {
    tags.iter()
        .fold(
            TagSpecification::builder().resource_type(ResourceType::NetworkInterface),
            |builder, (key, value)| builder.tags(Tag::builder().key(*key).value(value).build()),
        )
        .build()
}
