//! Wire messages of the `myservice.UserService` API.
//!
//! Requests carry static message descriptors so the instrumentation can read
//! them field by field. Missing JSON fields take their zero value, the same as
//! an unset proto3 scalar.
use serde::{Deserialize, Serialize};
use user_service_instrumentation::{
    FieldDescriptor, FieldValue, Introspect, Introspection, MessageDescriptor,
    SchemaIntrospectable,
};

pub const SERVICE_NAME: &str = "UserService";
pub const SERVICE_FULL_NAME: &str = "myservice.UserService";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

static GET_USER_REQUEST: MessageDescriptor = MessageDescriptor {
    full_name: "myservice.GetUserRequest",
    name: "GetUserRequest",
    fields: &[FieldDescriptor {
        name: "user_id",
        number: 1,
    }],
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetUserRequest {
    pub user_id: i64,
}

impl SchemaIntrospectable for GetUserRequest {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &GET_USER_REQUEST
    }

    fn field_value(&self, field: &FieldDescriptor) -> Option<FieldValue<'_>> {
        match field.number {
            1 => Some(FieldValue::I64(self.user_id)),
            _ => None,
        }
    }
}

impl Introspect for GetUserRequest {
    fn introspect(&self) -> Introspection<'_> {
        Introspection::Schema(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUserResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

static LIST_USERS_REQUEST: MessageDescriptor = MessageDescriptor {
    full_name: "myservice.ListUsersRequest",
    name: "ListUsersRequest",
    fields: &[
        FieldDescriptor {
            name: "page",
            number: 1,
        },
        FieldDescriptor {
            name: "page_size",
            number: 2,
        },
    ],
};

/// Paging is optional. Unset values fall back to the first page of ten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListUsersRequest {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl SchemaIntrospectable for ListUsersRequest {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &LIST_USERS_REQUEST
    }

    fn field_value(&self, field: &FieldDescriptor) -> Option<FieldValue<'_>> {
        match field.number {
            1 => self.page.map(FieldValue::I64),
            2 => self.page_size.map(FieldValue::I64),
            _ => None,
        }
    }
}

impl Introspect for ListUsersRequest {
    fn introspect(&self) -> Introspection<'_> {
        Introspection::Schema(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<User>,
    pub total: u64,
}

static INSERT_USER_REQUEST: MessageDescriptor = MessageDescriptor {
    full_name: "myservice.InsertUserRequest",
    name: "InsertUserRequest",
    fields: &[
        FieldDescriptor {
            name: "username",
            number: 1,
        },
        FieldDescriptor {
            name: "email",
            number: 2,
        },
    ],
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsertUserRequest {
    pub username: String,
    pub email: String,
}

impl SchemaIntrospectable for InsertUserRequest {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &INSERT_USER_REQUEST
    }

    fn field_value(&self, field: &FieldDescriptor) -> Option<FieldValue<'_>> {
        match field.number {
            1 => Some(FieldValue::Str(&self.username)),
            2 => Some(FieldValue::Str(&self.email)),
            _ => None,
        }
    }
}

impl Introspect for InsertUserRequest {
    fn introspect(&self) -> Introspection<'_> {
        Introspection::Schema(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}
