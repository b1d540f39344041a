//! In-memory GitLab used by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use gitlab_client::{
    ApprovalConfiguration, ApprovalConfigurationUpdate, ApproverGroup, ApproverUser,
    ApproversUpdate, BasicGroup, BasicUser, BranchAccessDescription, Error, GitLabApi, Group,
    Namespace, Page, Project, ProtectBranchOptions, ProtectedBranch, SlackService,
    SlackServiceUpdate,
};

/// A request received by [`FakeGitLab`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListGroups { page: u32, per_page: u32 },
    ListProjects { group_id: u64, page: u32, per_page: u32 },
    GetApprovals(u64),
    ChangeApprovals(u64, ApprovalConfigurationUpdate),
    ChangeApprovers(u64, ApproversUpdate),
    ListProtectedBranches(u64),
    Unprotect(u64, String),
    Protect(u64, ProtectBranchOptions),
    GetSlack(u64),
    SetSlack(u64, SlackServiceUpdate),
}

impl Call {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Call::ChangeApprovals(..)
                | Call::ChangeApprovers(..)
                | Call::Unprotect(..)
                | Call::Protect(..)
                | Call::SetSlack(..)
        )
    }
}

#[derive(Default)]
pub struct FakeState {
    pub groups: Vec<Group>,
    pub projects: HashMap<u64, Vec<Project>>,
    pub approvals: HashMap<u64, ApprovalConfiguration>,
    pub branches: HashMap<u64, Vec<ProtectedBranch>>,
    pub slack: HashMap<u64, SlackService>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub fail_listing: bool,
    pub fail_protect: HashSet<String>,
    pub calls: Vec<Call>,
}

#[derive(Default)]
pub struct FakeGitLab {
    pub state: Mutex<FakeState>,
}

impl FakeGitLab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(f: impl FnOnce(&mut FakeState)) -> Self {
        let fake = Self::new();
        f(&mut fake.state.lock().unwrap());
        fake
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn record(&self, call: Call) -> std::sync::MutexGuard<'_, FakeState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

fn server_error(message: &str) -> Error {
    Error::ApiError {
        status: 500,
        message: message.to_string(),
    }
}

fn paginate<T: Clone>(items: &[T], page: u32, per_page: u32) -> Page<T> {
    let per_page = per_page.max(1) as usize;
    let total_pages = items.len().div_ceil(per_page).max(1) as u32;
    let start = (page.saturating_sub(1) as usize) * per_page;
    let slice = items.iter().skip(start).take(per_page).cloned().collect();

    Page {
        items: slice,
        current_page: page,
        total_pages: Some(total_pages),
        next_page: (page < total_pages).then_some(page + 1),
    }
}

#[async_trait]
impl GitLabApi for FakeGitLab {
    async fn list_groups_page(&self, page: u32, per_page: u32) -> Result<Page<Group>, Error> {
        let state = self.record(Call::ListGroups { page, per_page });
        if state.fail_listing {
            return Err(server_error("listing failed"));
        }
        Ok(paginate(&state.groups, page, per_page))
    }

    async fn list_group_projects_page(
        &self,
        group_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Project>, Error> {
        let state = self.record(Call::ListProjects {
            group_id,
            page,
            per_page,
        });
        if state.fail_listing {
            return Err(server_error("listing failed"));
        }
        let projects = state.projects.get(&group_id).cloned().unwrap_or_default();
        Ok(paginate(&projects, page, per_page))
    }

    async fn get_approval_configuration(
        &self,
        project_id: u64,
    ) -> Result<ApprovalConfiguration, Error> {
        let state = self.record(Call::GetApprovals(project_id));
        if state.fail_reads {
            return Err(server_error("read failed"));
        }
        Ok(state.approvals.get(&project_id).cloned().unwrap_or_default())
    }

    async fn change_approval_configuration(
        &self,
        project_id: u64,
        update: &ApprovalConfigurationUpdate,
    ) -> Result<ApprovalConfiguration, Error> {
        let mut state = self.record(Call::ChangeApprovals(project_id, update.clone()));
        if state.fail_writes {
            return Err(server_error("write failed"));
        }
        let config = state.approvals.entry(project_id).or_default();
        config.approvals_before_merge = update.approvals_before_merge;
        config.reset_approvals_on_push = update.reset_approvals_on_push;
        config.disable_overriding_approvers_per_merge_request =
            update.disable_overriding_approvers_per_merge_request;
        config.merge_requests_author_approval = update.merge_requests_author_approval;
        config.merge_requests_disable_committers_approval =
            update.merge_requests_disable_committers_approval;
        config.require_password_to_approve = update.require_password_to_approve;
        Ok(config.clone())
    }

    async fn change_allowed_approvers(
        &self,
        project_id: u64,
        update: &ApproversUpdate,
    ) -> Result<ApprovalConfiguration, Error> {
        let mut state = self.record(Call::ChangeApprovers(project_id, update.clone()));
        if state.fail_writes {
            return Err(server_error("write failed"));
        }
        let config = state.approvals.entry(project_id).or_default();
        config.approvers = update
            .approver_ids
            .iter()
            .map(|id| ApproverUser {
                user: BasicUser {
                    id: *id,
                    username: format!("user{}", id),
                    name: String::new(),
                },
            })
            .collect();
        config.approver_groups = update
            .approver_group_ids
            .iter()
            .map(|id| ApproverGroup {
                group: BasicGroup {
                    id: *id,
                    name: String::new(),
                    full_path: String::new(),
                },
            })
            .collect();
        Ok(config.clone())
    }

    async fn list_protected_branches(
        &self,
        project_id: u64,
    ) -> Result<Vec<ProtectedBranch>, Error> {
        let state = self.record(Call::ListProtectedBranches(project_id));
        if state.fail_reads {
            return Err(server_error("read failed"));
        }
        Ok(state.branches.get(&project_id).cloned().unwrap_or_default())
    }

    async fn unprotect_branch(&self, project_id: u64, branch: &str) -> Result<(), Error> {
        let mut state = self.record(Call::Unprotect(project_id, branch.to_string()));
        if state.fail_writes {
            return Err(server_error("write failed"));
        }
        let branches = state.branches.entry(project_id).or_default();
        let before = branches.len();
        branches.retain(|b| b.name != branch);
        if branches.len() == before {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn protect_branch(
        &self,
        project_id: u64,
        options: &ProtectBranchOptions,
    ) -> Result<ProtectedBranch, Error> {
        let mut state = self.record(Call::Protect(project_id, options.clone()));
        if state.fail_writes || state.fail_protect.contains(&options.name) {
            return Err(server_error("write failed"));
        }
        let branch = ProtectedBranch {
            id: project_id * 100,
            name: options.name.clone(),
            push_access_levels: vec![BranchAccessDescription {
                access_level: options.push_access_level,
                access_level_description: String::new(),
            }],
            merge_access_levels: vec![BranchAccessDescription {
                access_level: options.merge_access_level,
                access_level_description: String::new(),
            }],
        };
        state
            .branches
            .entry(project_id)
            .or_default()
            .push(branch.clone());
        Ok(branch)
    }

    async fn get_slack_service(&self, project_id: u64) -> Result<SlackService, Error> {
        let state = self.record(Call::GetSlack(project_id));
        if state.fail_reads {
            return Err(server_error("read failed"));
        }
        Ok(state.slack.get(&project_id).cloned().unwrap_or_default())
    }

    async fn set_slack_service(
        &self,
        project_id: u64,
        update: &SlackServiceUpdate,
    ) -> Result<(), Error> {
        let mut state = self.record(Call::SetSlack(project_id, update.clone()));
        if state.fail_writes {
            return Err(server_error("write failed"));
        }
        let service = state.slack.entry(project_id).or_default();
        service.active = update.active;
        service.push_events = update.push_events;
        service.issues_events = update.issues_events;
        service.confidential_issues_events = update.confidential_issues_events;
        service.merge_requests_events = update.merge_requests_events;
        service.tag_push_events = update.tag_push_events;
        service.note_events = update.note_events;
        service.confidential_note_events = update.confidential_note_events;
        service.pipeline_events = update.pipeline_events;
        service.wiki_page_events = update.wiki_page_events;
        // GitLab does not echo the webhook URL back.
        service.properties.username = update.username.clone();
        service.properties.channel = update.channel.clone();
        service.properties.notify_only_broken_pipelines = update.notify_only_broken_pipelines;
        service.properties.notify_only_default_branch = update.notify_only_default_branch;
        Ok(())
    }
}

pub fn group(id: u64, full_path: &str) -> Group {
    let name = full_path.rsplit('/').next().unwrap_or(full_path).to_string();
    Group {
        id,
        name: name.clone(),
        path: name,
        full_path: full_path.to_string(),
        web_url: format!("https://gitlab.example.com/groups/{}", full_path),
    }
}

pub fn project(id: u64, namespace: &str, name: &str) -> Project {
    Project {
        id,
        name: name.to_string(),
        path_with_namespace: format!("{}/{}", namespace, name),
        namespace: Namespace {
            id: id * 10,
            name: namespace.rsplit('/').next().unwrap_or(namespace).to_string(),
            path: namespace.rsplit('/').next().unwrap_or(namespace).to_string(),
            full_path: namespace.to_string(),
        },
    }
}

pub fn protected(name: &str, merge: u32, push: u32) -> ProtectedBranch {
    ProtectedBranch {
        id: 1,
        name: name.to_string(),
        push_access_levels: vec![BranchAccessDescription {
            access_level: push,
            access_level_description: String::new(),
        }],
        merge_access_levels: vec![BranchAccessDescription {
            access_level: merge,
            access_level_description: String::new(),
        }],
    }
}
