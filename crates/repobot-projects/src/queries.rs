//! GraphQL query and mutation texts for the Projects v2 API.

pub(crate) const USER_ID_QUERY: &str = r"
query($login: String!) {
  user(login: $login) { id }
}
";

pub(crate) const ORG_ID_QUERY: &str = r"
query($login: String!) {
  organization(login: $login) { id }
}
";

pub(crate) const ISSUE_ID_QUERY: &str = r"
query($owner: String!, $repo: String!, $number: Int!) {
  repository(owner: $owner, name: $repo) {
    issue(number: $number) { id }
  }
}
";

pub(crate) const PR_ID_QUERY: &str = r"
query($owner: String!, $repo: String!, $number: Int!) {
  repository(owner: $owner, name: $repo) {
    pullRequest(number: $number) { id }
  }
}
";

pub(crate) const USER_PROJECTS_QUERY: &str = r"
query($login: String!, $limit: Int!) {
  user(login: $login) {
    projectsV2(first: $limit, orderBy: {field: UPDATED_AT, direction: DESC}) {
      totalCount
      nodes {
        id
        number
        title
        shortDescription
        url
        closed
        public
        updatedAt
        items { totalCount }
      }
    }
  }
}
";

pub(crate) const ORG_PROJECTS_QUERY: &str = r"
query($login: String!, $limit: Int!) {
  organization(login: $login) {
    projectsV2(first: $limit, orderBy: {field: UPDATED_AT, direction: DESC}) {
      totalCount
      nodes {
        id
        number
        title
        shortDescription
        url
        closed
        public
        updatedAt
        items { totalCount }
      }
    }
  }
}
";

pub(crate) const PROJECT_DETAIL_QUERY: &str = r"
query($projectId: ID!, $itemsLimit: Int!) {
  node(id: $projectId) {
    ... on ProjectV2 {
      id
      number
      title
      shortDescription
      readme
      url
      public
      closed
      createdAt
      updatedAt
      creator { login }
      owner {
        ... on User { login }
        ... on Organization { login }
      }
      repositories(first: 20) {
        nodes { nameWithOwner }
      }
      views(first: 20) {
        nodes {
          id
          name
          number
          layout
          filter
        }
      }
      workflows(first: 20) {
        nodes {
          id
          name
          number
          enabled
        }
      }
      fields(first: 30) {
        nodes {
          ... on ProjectV2Field {
            id
            name
            dataType
          }
          ... on ProjectV2SingleSelectField {
            id
            name
            dataType
            options {
              id
              name
              color
              description
            }
          }
          ... on ProjectV2IterationField {
            id
            name
            dataType
            configuration {
              duration
              startDay
              iterations {
                id
                title
                startDate
                duration
              }
            }
          }
        }
      }
      items(first: $itemsLimit) {
        totalCount
        nodes {
          id
          type
          isArchived
          createdAt
          updatedAt
          content {
            ... on Issue {
              id
              number
              title
              state
              url
              repository { nameWithOwner }
              labels(first: 10) { nodes { name color } }
              assignees(first: 5) { nodes { login } }
            }
            ... on PullRequest {
              id
              number
              title
              state
              url
              repository { nameWithOwner }
              labels(first: 10) { nodes { name color } }
              assignees(first: 5) { nodes { login } }
            }
            ... on DraftIssue {
              id
              title
              body
            }
          }
          fieldValues(first: 20) {
            nodes {
              ... on ProjectV2ItemFieldTextValue {
                text
                field { ... on ProjectV2Field { name } }
              }
              ... on ProjectV2ItemFieldNumberValue {
                number
                field { ... on ProjectV2Field { name } }
              }
              ... on ProjectV2ItemFieldDateValue {
                date
                field { ... on ProjectV2Field { name } }
              }
              ... on ProjectV2ItemFieldSingleSelectValue {
                name
                optionId
                field { ... on ProjectV2SingleSelectField { name } }
              }
              ... on ProjectV2ItemFieldIterationValue {
                title
                startDate
                duration
                field { ... on ProjectV2IterationField { name } }
              }
            }
          }
        }
      }
    }
  }
}
";

pub(crate) const CREATE_PROJECT_MUTATION: &str = r"
mutation($ownerId: ID!, $title: String!) {
  createProjectV2(input: {ownerId: $ownerId, title: $title}) {
    projectV2 {
      id
      number
      title
      url
    }
  }
}
";

pub(crate) const UPDATE_PROJECT_DESCRIPTION_MUTATION: &str = r"
mutation($projectId: ID!, $shortDescription: String!) {
  updateProjectV2(input: {projectId: $projectId, shortDescription: $shortDescription}) {
    projectV2 {
      id
      shortDescription
    }
  }
}
";

pub(crate) const ADD_ITEM_MUTATION: &str = r"
mutation($projectId: ID!, $contentId: ID!) {
  addProjectV2ItemById(input: {projectId: $projectId, contentId: $contentId}) {
    item {
      id
      type
      content {
        ... on Issue { id number title url }
        ... on PullRequest { id number title url }
      }
    }
  }
}
";

pub(crate) const ADD_DRAFT_ISSUE_MUTATION: &str = r"
mutation($projectId: ID!, $title: String!, $body: String) {
  addProjectV2DraftIssue(input: {projectId: $projectId, title: $title, body: $body}) {
    projectItem {
      id
      type
      content {
        ... on DraftIssue { id title body }
      }
    }
  }
}
";

pub(crate) const DELETE_ITEM_MUTATION: &str = r"
mutation($projectId: ID!, $itemId: ID!) {
  deleteProjectV2Item(input: {projectId: $projectId, itemId: $itemId}) {
    deletedItemId
  }
}
";

pub(crate) const ARCHIVE_ITEM_MUTATION: &str = r"
mutation($projectId: ID!, $itemId: ID!) {
  archiveProjectV2Item(input: {projectId: $projectId, itemId: $itemId}) {
    item { id isArchived }
  }
}
";

pub(crate) const UNARCHIVE_ITEM_MUTATION: &str = r"
mutation($projectId: ID!, $itemId: ID!) {
  unarchiveProjectV2Item(input: {projectId: $projectId, itemId: $itemId}) {
    item { id isArchived }
  }
}
";

pub(crate) const UPDATE_FIELD_VALUE_MUTATION: &str = r"
mutation($projectId: ID!, $itemId: ID!, $fieldId: ID!, $value: ProjectV2FieldValue!) {
  updateProjectV2ItemFieldValue(input: {
    projectId: $projectId,
    itemId: $itemId,
    fieldId: $fieldId,
    value: $value
  }) {
    projectV2Item { id }
  }
}
";

pub(crate) const CLEAR_FIELD_VALUE_MUTATION: &str = r"
mutation($projectId: ID!, $itemId: ID!, $fieldId: ID!) {
  clearProjectV2ItemFieldValue(input: {
    projectId: $projectId,
    itemId: $itemId,
    fieldId: $fieldId
  }) {
    projectV2Item { id }
  }
}
";

pub(crate) const CREATE_FIELD_MUTATION: &str = r"
mutation($projectId: ID!, $name: String!, $dataType: ProjectV2CustomFieldType!) {
  createProjectV2Field(input: {
    projectId: $projectId,
    dataType: $dataType,
    name: $name
  }) {
    projectV2Field {
      ... on ProjectV2Field { id name dataType }
    }
  }
}
";

pub(crate) const CREATE_SELECT_FIELD_MUTATION: &str = r"
mutation($projectId: ID!, $name: String!, $dataType: ProjectV2CustomFieldType!, $options: [ProjectV2SingleSelectFieldOptionInput!]!) {
  createProjectV2Field(input: {
    projectId: $projectId,
    dataType: $dataType,
    name: $name,
    singleSelectOptions: $options
  }) {
    projectV2Field {
      ... on ProjectV2SingleSelectField {
        id
        name
        options { id name color }
      }
    }
  }
}
";

pub(crate) const CREATE_STATUS_UPDATE_MUTATION: &str = r"
mutation($projectId: ID!, $body: String!, $status: ProjectV2StatusUpdateStatus, $startDate: Date, $targetDate: Date) {
  createProjectV2StatusUpdate(input: {
    projectId: $projectId,
    body: $body,
    status: $status,
    startDate: $startDate,
    targetDate: $targetDate
  }) {
    statusUpdate {
      id
      body
      status
      createdAt
    }
  }
}
";
