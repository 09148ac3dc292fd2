//! Helper macro generating port error enums with snake_case constructors.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SamplePortError {
            Missing { path: String } => "missing: {path}",
            Status { status: u16 } => "status: {status}",
            Failed { path: String, status: u16 } => "failed: {path} ({status})",
            Closed => "closed",
        }
    }

    #[test]
    fn string_fields_accept_str() {
        let err = SamplePortError::missing("/users");
        assert_eq!(err.to_string(), "missing: /users");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        let err = SamplePortError::status(503_u16);
        assert_eq!(err, SamplePortError::Status { status: 503 });
    }

    #[test]
    fn mixed_fields_and_unit_variants() {
        assert_eq!(
            SamplePortError::failed("/events", 502_u16).to_string(),
            "failed: /events (502)"
        );
        assert_eq!(SamplePortError::closed().to_string(), "closed");
    }
}
