//! GraphQL documents and response shapes of the Launch management API.

use appctl_primitives::hosting::LaunchProject;
use serde::Deserialize;
use url::Url;

pub(crate) const GRAPHQL_PATH: &str = "manage/graphql";

pub(crate) const PROJECTS_QUERY: &str = r#"query Projects {
  projects(query: { first: 100 }) {
    edges {
      node {
        uid
        name
        integrations { developerHubApp { uid } }
        environments(query: { first: 1 }) {
          edges {
            node {
              uid
              deployments(query: { first: 1, sortBy: "createdAt", order: "DESC" }) {
                edges { node { url } }
              }
            }
          }
        }
      }
    }
  }
}"#;

pub(crate) const CREATE_PROJECT_MUTATION: &str = r#"mutation CreateProject($project: CreateProjectInput!) {
  createProject(project: $project) {
    uid
    name
    integrations { developerHubApp { uid } }
    environments(query: { first: 1 }) {
      edges {
        node {
          uid
          deployments(query: { first: 1, sortBy: "createdAt", order: "DESC" }) {
            edges { node { url } }
          }
        }
      }
    }
  }
}"#;

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    edges: Vec<Edge<T>>,
}

impl<T> Connection<T> {
    fn into_first(self) -> Option<T> {
        self.edges.into_iter().next().map(|edge| edge.node)
    }
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Integrations {
    developer_hub_app: Option<AppRef>,
}

#[derive(Debug, Deserialize)]
struct AppRef {
    uid: String,
}

#[derive(Debug, Deserialize)]
struct EnvironmentNode {
    uid: String,
    deployments: Option<Connection<DeploymentNode>>,
}

#[derive(Debug, Deserialize)]
struct DeploymentNode {
    url: Option<Url>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectNode {
    uid: String,
    name: String,
    integrations: Option<Integrations>,
    environments: Option<Connection<EnvironmentNode>>,
}

impl From<ProjectNode> for LaunchProject {
    fn from(node: ProjectNode) -> Self {
        let developer_hub_app_uid = node
            .integrations
            .and_then(|integrations| integrations.developer_hub_app)
            .map(|app| app.uid);

        let environment = node.environments.and_then(Connection::into_first);

        let (environment_uid, deployment_url) = match environment {
            Some(environment) => {
                let url = environment
                    .deployments
                    .and_then(Connection::into_first)
                    .and_then(|deployment| deployment.url);
                (Some(environment.uid), url)
            }
            None => (None, None),
        };

        Self {
            uid: node.uid,
            name: node.name,
            developer_hub_app_uid,
            environment_uid,
            deployment_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectsData {
    projects: Connection<ProjectNode>,
}

impl ProjectsData {
    pub(crate) fn into_projects(self) -> Vec<LaunchProject> {
        self.projects
            .edges
            .into_iter()
            .map(|edge| edge.node.into())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateProjectData {
    pub(crate) create_project: ProjectNode,
}
