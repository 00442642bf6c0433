/// Implements the standard arithmetic operator traits for an integer newtype.
///
/// Usage:
/// * `op!(binary Sompi, Add, add)` implements `Add` for owned and borrowed operands.
/// * `op!(inplace Sompi, AddAssign, add_assign)` implements the in-place variant.
/// * `op!(unary Sompi, Neg, neg)` implements the unary variant.
#[macro_export]
macro_rules! op {
    (binary $type:ty, $trait:ident, $method:ident) => {
        impl $trait for $type {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                Self(self.0.$method(rhs.0))
            }
        }

        impl<'a> $trait<&'a $type> for $type {
            type Output = $type;

            fn $method(self, rhs: &'a $type) -> Self::Output {
                <$type>::from(self.0.$method(rhs.0))
            }
        }

        impl<'a, 'b> $trait<&'b $type> for &'a $type {
            type Output = $type;

            fn $method(self, rhs: &'b $type) -> Self::Output {
                <$type>::from(self.0.$method(rhs.0))
            }
        }
    };
    (inplace $type:ty, $trait:ident, $method:ident) => {
        impl $trait for $type {
            fn $method(&mut self, rhs: Self) {
                self.0.$method(rhs.0)
            }
        }
    };
    (unary $type:ty, $trait:ident, $method:ident) => {
        impl $trait for $type {
            type Output = Self;

            fn $method(self) -> Self::Output {
                Self(self.0.$method())
            }
        }
    };
}
