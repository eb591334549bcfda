use crate::introspect::Introspect;

/// `Handler: <service>.<request type>`, using the fully-qualified message name
/// when the request has a schema.
pub fn dynamic_span_name<R>(service_name: &str, request: &R) -> String
where
    R: Introspect + ?Sized,
{
    format!(
        "Handler: {}.{}",
        service_name,
        request.introspect().qualified_name()
    )
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::dynamic_span_name;
    use crate::introspect::{
        FieldDescriptor, FieldValue, Introspect, Introspection, MessageDescriptor,
        SchemaIntrospectable,
    };
    use crate::plain_request;

    static EMPTY: MessageDescriptor = MessageDescriptor {
        full_name: "pkg.v1.Empty",
        name: "Empty",
        fields: &[],
    };

    struct Empty;

    impl SchemaIntrospectable for Empty {
        fn descriptor(&self) -> &'static MessageDescriptor {
            &EMPTY
        }

        fn field_value(&self, _field: &FieldDescriptor) -> Option<FieldValue<'_>> {
            None
        }
    }

    impl Introspect for Empty {
        fn introspect(&self) -> Introspection<'_> {
            Introspection::Schema(self)
        }
    }

    #[derive(Serialize)]
    struct Heartbeat {}

    plain_request!(Heartbeat);

    #[test]
    fn schema_requests_use_full_name() {
        insta::assert_snapshot!(dynamic_span_name("Pinger", &Empty), @"Handler: Pinger.pkg.v1.Empty");
    }

    #[test]
    fn plain_requests_use_type_name() {
        insta::assert_snapshot!(dynamic_span_name("Pinger", &Heartbeat {}), @"Handler: Pinger.Heartbeat");
    }
}
