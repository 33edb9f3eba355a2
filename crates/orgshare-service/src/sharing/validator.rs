//! Instruction validation.
//!
//! Pure functions turning a request into a validated instruction. No
//! collaborator is consulted; the first violated constraint is reported as
//! a validation error.

use orgshare_core::error::AppError;
use orgshare_core::result::AppResult;
use orgshare_core::types::{OrganizationId, RoleAudience, UserId};
use orgshare_entity::{
    GeneralShare, GeneralShareRequest, GeneralUnshareRequest, OrganizationShare,
    OrganizationShareRequest, RoleReferenceRequest, RoleWithAudience, SelectiveShare,
    SelectiveShareRequest, SelectiveUnshareRequest, SharingPolicy, USER_IDS, UnshareInstruction,
    UserCriteria,
};

/// Validate a selective share request.
pub fn validate_selective_share(request: Option<SelectiveShareRequest>) -> AppResult<SelectiveShare> {
    let request = request.ok_or_else(|| AppError::validation("Selective share request is null"))?;
    let user_ids = validate_user_criteria(request.user_criteria)?;

    let entries = request
        .organizations
        .ok_or_else(|| AppError::validation("organizations must not be null"))?;

    let organizations = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| validate_organization_entry(index, entry))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(SelectiveShare {
        user_ids,
        organizations,
    })
}

/// Validate a general share request.
pub fn validate_general_share(request: Option<GeneralShareRequest>) -> AppResult<GeneralShare> {
    let request = request.ok_or_else(|| AppError::validation("General share request is null"))?;
    let user_ids = validate_user_criteria(request.user_criteria)?;

    let policy = request
        .policy
        .ok_or_else(|| AppError::validation("policy must not be null"))?;
    if policy.requires_declared_organization() {
        return Err(AppError::validation(format!(
            "policy {policy} needs a declared organization and cannot be used for a general share"
        )));
    }

    let roles = validate_roles(request.roles, "roles")?;

    Ok(GeneralShare {
        user_ids,
        policy,
        roles,
    })
}

/// Validate a selective unshare request.
pub fn validate_selective_unshare(
    request: Option<SelectiveUnshareRequest>,
) -> AppResult<UnshareInstruction> {
    let request =
        request.ok_or_else(|| AppError::validation("Selective unshare request is null"))?;
    let user_ids = validate_user_criteria(request.user_criteria)?;

    let organizations = request
        .organizations
        .ok_or_else(|| AppError::validation("organizations must not be null"))?
        .into_iter()
        .enumerate()
        .map(|(index, org)| {
            org.ok_or_else(|| AppError::validation(format!("organizations[{index}] must not be null")))
        })
        .collect::<AppResult<Vec<OrganizationId>>>()?;

    Ok(UnshareInstruction::Selective {
        user_ids,
        organizations: dedup(organizations),
    })
}

/// Validate a general unshare request.
pub fn validate_general_unshare(
    request: Option<GeneralUnshareRequest>,
) -> AppResult<UnshareInstruction> {
    let request = request.ok_or_else(|| AppError::validation("General unshare request is null"))?;
    let user_ids = validate_user_criteria(request.user_criteria)?;
    Ok(UnshareInstruction::General { user_ids })
}

/// Extract the user list from criteria. Duplicates are dropped, keeping the
/// first occurrence.
fn validate_user_criteria(criteria: Option<UserCriteria>) -> AppResult<Vec<UserId>> {
    let mut criteria =
        criteria.ok_or_else(|| AppError::validation("userCriteria must not be null"))?;

    if let Some(unknown) = criteria.keys().find(|key| key.as_str() != USER_IDS) {
        return Err(AppError::validation(format!(
            "userCriteria has unsupported key '{unknown}'; only '{USER_IDS}' is accepted"
        )));
    }

    let user_ids = criteria
        .remove(USER_IDS)
        .ok_or_else(|| AppError::validation(format!("userCriteria must contain '{USER_IDS}'")))?
        .ok_or_else(|| AppError::validation(format!("userCriteria.{USER_IDS} must not be null")))?;
    if user_ids.is_empty() {
        return Err(AppError::validation(format!(
            "userCriteria.{USER_IDS} must not be empty"
        )));
    }

    Ok(dedup(user_ids))
}

fn validate_organization_entry(
    index: usize,
    entry: OrganizationShareRequest,
) -> AppResult<OrganizationShare> {
    let organization_id = entry
        .organization_id
        .ok_or_else(|| AppError::validation(format!("organizations[{index}].orgId must not be null")))?;
    let policy: SharingPolicy = entry
        .policy
        .ok_or_else(|| AppError::validation(format!("organizations[{index}].policy must not be null")))?;
    let roles = validate_roles(entry.roles, &format!("organizations[{index}].roles"))?;

    Ok(OrganizationShare {
        organization_id,
        policy,
        roles,
    })
}

fn validate_roles(
    roles: Option<Vec<RoleReferenceRequest>>,
    field: &str,
) -> AppResult<Vec<RoleWithAudience>> {
    let roles = roles.ok_or_else(|| AppError::validation(format!("{field} must not be null")))?;

    let validated = roles
        .into_iter()
        .enumerate()
        .map(|(index, role)| {
            let role_name = required(role.role_name, field, index, "roleName")?;
            let audience_name = required(role.audience_name, field, index, "audienceName")?;
            let audience_type = required(role.audience_type, field, index, "audienceType")?;
            Ok(RoleWithAudience {
                role_name,
                audience: RoleAudience::new(audience_name, audience_type),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(dedup(validated))
}

fn required(value: Option<String>, field: &str, index: usize, name: &str) -> AppResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::validation(format!(
            "{field}[{index}].{name} must not be blank"
        ))),
    }
}

fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}
