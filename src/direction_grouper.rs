/// Direction grouper - merges consecutive segments that share an elevation sign class.
use crate::segment::Segment;

pub fn group_by_direction(segments: &[Segment]) -> Vec<Segment> {
    let Some((first, rest)) = segments.split_first() else {
        return Vec::new();
    };

    let mut grouped = Vec::new();
    let mut current = *first;
    let mut direction = current.sign_class();

    for segment in rest {
        if segment.sign_class() == direction {
            current.absorb(segment);
        } else {
            grouped.push(current);
            current = *segment;
            direction = current.sign_class();
        }
    }

    grouped.push(current);
    grouped
}
