// Outputs
pub const TAGS_LIST_OUTPUT: &str = "tags_list";
pub const LABELS_OUTPUT: &str = "labels";
pub const IMAGE_ID_OUTPUT: &str = "imageid";
pub const DIGEST_OUTPUT: &str = "digest";
pub const METADATA_OUTPUT: &str = "metadata";

// Labels
pub const IMAGE_AUTHORS_LABEL: &str = "org.opencontainers.image.authors";
pub const IMAGE_CREATED_LABEL: &str = "org.opencontainers.image.created";
pub const IMAGE_REVISION_LABEL: &str = "org.opencontainers.image.revision";
pub const IMAGE_SOURCE_LABEL: &str = "org.opencontainers.image.source";
pub const IMAGE_TITLE_LABEL: &str = "org.opencontainers.image.title";
pub const IMAGE_URL_LABEL: &str = "org.opencontainers.image.url";
pub const IMAGE_VERSION_LABEL: &str = "org.opencontainers.image.version";

// BuildPush vars
pub const BP_BASE_TAG: &str = "BP_BASE_TAG";
pub const BP_BUILD_ARGS: &str = "BP_BUILD_ARGS";
pub const BP_BUILD_DRIVER: &str = "BP_BUILD_DRIVER";
pub const BP_CACHE_FROM: &str = "BP_CACHE_FROM";
pub const BP_CACHE_TO: &str = "BP_CACHE_TO";
pub const BP_CI_DRIVER: &str = "BP_CI_DRIVER";
pub const BP_CONTEXT: &str = "BP_CONTEXT";
pub const BP_DEFAULT_BRANCH: &str = "BP_DEFAULT_BRANCH";
pub const BP_DRY_RUN: &str = "BP_DRY_RUN";
pub const BP_FILE: &str = "BP_FILE";
pub const BP_INCLUDE_REF_TAGS: &str = "BP_INCLUDE_REF_TAGS";
pub const BP_INCLUDE_SEMVER_TAGS: &str = "BP_INCLUDE_SEMVER_TAGS";
pub const BP_JSON_TARGETS: &str = "BP_JSON_TARGETS";
pub const BP_LABELS: &str = "BP_LABELS";
pub const BP_LOAD: &str = "BP_LOAD";
pub const BP_LOG_OUT: &str = "BP_LOG_OUT";
pub const BP_METADATA_LABELS: &str = "BP_METADATA_LABELS";
pub const BP_PLATFORMS: &str = "BP_PLATFORMS";
pub const BP_PUSH: &str = "BP_PUSH";
pub const BP_REPOSITORIES: &str = "BP_REPOSITORIES";
pub const BP_TAGS: &str = "BP_TAGS";
pub const BP_TAG_LATEST: &str = "BP_TAG_LATEST";
pub const BP_TAG_SHA: &str = "BP_TAG_SHA";
pub const BP_TARGET: &str = "BP_TARGET";

// GitHub CI vars
pub const GITHUB_ACTIONS: &str = "GITHUB_ACTIONS";
pub const GITHUB_ACTOR: &str = "GITHUB_ACTOR";
pub const GITHUB_EVENT_NAME: &str = "GITHUB_EVENT_NAME";
pub const GITHUB_EVENT_PATH: &str = "GITHUB_EVENT_PATH";
pub const GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";
pub const GITHUB_REF_NAME: &str = "GITHUB_REF_NAME";
pub const GITHUB_REF_TYPE: &str = "GITHUB_REF_TYPE";
pub const GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const GITHUB_RUN_ID: &str = "GITHUB_RUN_ID";
pub const GITHUB_SERVER_URL: &str = "GITHUB_SERVER_URL";
pub const GITHUB_SHA: &str = "GITHUB_SHA";
pub const GITHUB_STEP_SUMMARY: &str = "GITHUB_STEP_SUMMARY";

// GitLab CI vars
pub const CI_COMMIT_REF_NAME: &str = "CI_COMMIT_REF_NAME";
pub const CI_COMMIT_SHA: &str = "CI_COMMIT_SHA";
pub const CI_COMMIT_TAG: &str = "CI_COMMIT_TAG";
pub const CI_DEFAULT_BRANCH: &str = "CI_DEFAULT_BRANCH";
pub const CI_MERGE_REQUEST_IID: &str = "CI_MERGE_REQUEST_IID";
pub const CI_PIPELINE_SOURCE: &str = "CI_PIPELINE_SOURCE";
pub const CI_PIPELINE_URL: &str = "CI_PIPELINE_URL";
pub const CI_PROJECT_URL: &str = "CI_PROJECT_URL";
pub const GITLAB_CI: &str = "GITLAB_CI";
pub const GITLAB_USER_LOGIN: &str = "GITLAB_USER_LOGIN";

// Misc
pub const DEFAULT_BRANCH: &str = "main";
pub const LATEST_TAG: &str = "latest";
pub const SHORT_SHA_LEN: usize = 7;
pub const USER: &str = "USER";
